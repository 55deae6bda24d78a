use crate::core::reproject::CrsTransform;
use crate::types::{LstError, LstResult};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};

/// Well-known-text description of the MODIS sinusoidal source projection,
/// shipped as a package-local resource.
pub fn modis_sin_wkt() -> &'static str {
    include_str!("../../resources/modis_sin.wkt")
}

/// GDAL-backed coordinate transform between two WKT-described CRS.
///
/// Not `Send`: each per-date worker builds its own instance.
pub struct ProjectionTransform {
    inner: CoordTransform,
}

impl ProjectionTransform {
    /// Build a transform from `src_wkt` into `dst_wkt`.
    pub fn new(src_wkt: &str, dst_wkt: &str) -> LstResult<Self> {
        let mut src = SpatialRef::from_wkt(src_wkt).map_err(|e| {
            LstError::Configuration(format!("unreadable source CRS definition: {}", e))
        })?;
        let mut dst = SpatialRef::from_wkt(dst_wkt).map_err(|e| {
            LstError::Configuration(format!("unreadable target CRS definition: {}", e))
        })?;
        src.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        dst.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let inner = CoordTransform::new(&src, &dst).map_err(|e| {
            LstError::Configuration(format!("cannot build coordinate transform: {}", e))
        })?;
        Ok(ProjectionTransform { inner })
    }
}

impl CrsTransform for ProjectionTransform {
    fn transform_coords(&self, xs: &mut [f64], ys: &mut [f64]) -> LstResult<()> {
        self.inner.transform_coords(xs, ys, &mut [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modis_sin_wkt_resource_resolves() {
        let wkt = modis_sin_wkt();
        assert!(wkt.contains("Sinusoidal"));
        assert!(wkt.contains("6371007.181"));
    }
}
