use crate::types::{Boundary, BoundingBox, LstError, LstResult};
use geo::{coord, BoundingRect, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape};
use std::path::Path;

/// Reads the drainage-boundary polygon dataset: clip geometry, extent
/// envelope and the CRS that all downstream rasters inherit.
pub struct BoundaryReader;

impl BoundaryReader {
    /// Read an ESRI Shapefile boundary dataset.
    ///
    /// The `.prj` sidecar is mandatory: without it the output CRS of the
    /// whole run would be undefined.
    pub fn read<P: AsRef<Path>>(path: P) -> LstResult<Boundary> {
        let path = path.as_ref();
        log::info!("Reading boundary dataset: {}", path.display());

        Self::verify_components(path)?;
        let crs_wkt = Self::read_projection(path)?;

        let mut reader = shapefile::Reader::from_path(path).map_err(|e| {
            LstError::Configuration(format!(
                "cannot open boundary dataset {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        for shape_record in reader.iter_shapes_and_records() {
            let (shape, _record) = shape_record.map_err(|e| {
                LstError::Configuration(format!(
                    "cannot read boundary feature from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if let Shape::Polygon(polygon) = shape {
                Self::collect_rings(&polygon, &mut polygons);
            }
        }

        if polygons.is_empty() {
            return Err(LstError::Configuration(format!(
                "boundary dataset {} contains no polygon features",
                path.display()
            )));
        }

        let geometry = MultiPolygon::new(polygons);
        let rect = geometry.bounding_rect().ok_or_else(|| {
            LstError::Configuration("boundary geometry has no extent".to_string())
        })?;
        let bbox = BoundingBox {
            min_x: rect.min().x,
            max_x: rect.max().x,
            min_y: rect.min().y,
            max_y: rect.max().y,
        };

        log::info!(
            "Boundary extent: x [{:.2}, {:.2}], y [{:.2}, {:.2}]",
            bbox.min_x,
            bbox.max_x,
            bbox.min_y,
            bbox.max_y
        );

        Ok(Boundary {
            geometry,
            bbox,
            crs_wkt,
        })
    }

    /// Convert one shapefile polygon into geo polygons, attaching each inner
    /// ring to the outer ring that precedes it in ring order.
    fn collect_rings(polygon: &shapefile::Polygon, out: &mut Vec<Polygon<f64>>) {
        for ring in polygon.rings() {
            let coords: Vec<_> = ring
                .points()
                .iter()
                .map(|p| coord! { x: p.x, y: p.y })
                .collect();
            let line = LineString::from(coords);
            match ring {
                PolygonRing::Outer(_) => out.push(Polygon::new(line, Vec::new())),
                PolygonRing::Inner(_) => {
                    if let Some(parent) = out.last_mut() {
                        parent.interiors_push(line);
                    } else {
                        log::warn!("Inner ring without a preceding outer ring, skipping");
                    }
                }
            }
        }
    }

    fn verify_components(path: &Path) -> LstResult<()> {
        if path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("shp"))
            != Some(true)
        {
            return Err(LstError::Configuration(format!(
                "boundary dataset must be a Shapefile (.shp): {}",
                path.display()
            )));
        }
        let base = path.with_extension("");
        for ext in ["shp", "shx", "dbf"] {
            let component = base.with_extension(ext);
            if !component.exists() {
                return Err(LstError::Configuration(format!(
                    "missing boundary component file: {}",
                    component.display()
                )));
            }
        }
        Ok(())
    }

    /// Read the boundary CRS from the `.prj` sidecar.
    fn read_projection(path: &Path) -> LstResult<String> {
        let prj_path = path.with_extension("prj");
        let wkt = std::fs::read_to_string(&prj_path).map_err(|e| {
            LstError::Configuration(format!(
                "cannot read boundary projection {}: {}",
                prj_path.display(),
                e
            ))
        })?;
        let wkt = wkt.trim().to_string();
        if wkt.is_empty() {
            return Err(LstError::Configuration(format!(
                "boundary projection file {} is empty",
                prj_path.display()
            )));
        }
        Ok(wkt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_boundary_is_configuration_error() {
        let err = BoundaryReader::read("/nonexistent/watersheds.shp").unwrap_err();
        assert!(matches!(err, LstError::Configuration(_)));
    }

    #[test]
    fn test_non_shapefile_path_is_rejected() {
        let err = BoundaryReader::read("/tmp/boundary.geojson").unwrap_err();
        assert!(matches!(err, LstError::Configuration(_)));
    }

    #[test]
    fn test_missing_prj_sidecar_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["shp", "shx", "dbf"] {
            std::fs::write(dir.path().join(format!("rca.{}", ext)), b"").unwrap();
        }
        let err = BoundaryReader::read(dir.path().join("rca.shp")).unwrap_err();
        match err {
            LstError::Configuration(msg) => assert!(msg.contains("projection")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
