use crate::types::{GeoTransform, LstError, LstResult, Tile, TileBand};
use gdal::{Dataset, Metadata};
use ndarray::Array2;

/// Reads the LST science band out of a tile container.
///
/// MODIS tiles are multi-band HDF containers; the science sub-dataset is
/// selected by name from the container's subdataset metadata. Plain
/// single-band rasters (e.g. already-converted GeoTIFFs) pass through
/// directly.
pub struct TileReader {
    science_band: String,
}

impl Default for TileReader {
    fn default() -> Self {
        TileReader::new("LST_Day_1km")
    }
}

impl TileReader {
    pub fn new(science_band: &str) -> Self {
        TileReader {
            science_band: science_band.to_string(),
        }
    }

    /// Read the science band of one tile into memory.
    pub fn read(&self, tile: &Tile) -> LstResult<TileBand> {
        log::debug!("Reading tile: {}", tile.path.display());

        let container = Dataset::open(&tile.path).map_err(|e| {
            LstError::InputData(format!(
                "cannot open tile file {}: {}",
                tile.path.display(),
                e
            ))
        })?;

        let dataset = match self.select_subdataset(&container)? {
            Some(name) => {
                log::debug!("Selected science sub-dataset: {}", name);
                Dataset::open(&name)?
            }
            None => container,
        };

        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let projection = dataset.projection();
        let (width, height) = dataset.raster_size();

        let rasterband = dataset.rasterband(1)?;
        let nodata = rasterband.no_data_value().map(|v| v as f32);
        let band_data =
            rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let data = Array2::from_shape_vec((height, width), band_data.into_shape_and_vec().1).map_err(|e| {
            LstError::InputData(format!(
                "failed to reshape band data from {}: {}",
                tile.path.display(),
                e
            ))
        })?;

        Ok(TileBand {
            data,
            geo_transform,
            projection,
            nodata,
        })
    }

    /// Locate the science sub-dataset inside a multi-band container.
    ///
    /// Returns `Ok(None)` when the file has no subdatasets at all (plain
    /// raster). A container that has subdatasets but none matching the
    /// configured science band is a configuration error.
    fn select_subdataset(&self, container: &Dataset) -> LstResult<Option<String>> {
        let entries = match container.metadata_domain("SUBDATASETS") {
            Some(entries) if !entries.is_empty() => entries,
            _ => return Ok(None),
        };

        for entry in &entries {
            if let Some((key, value)) = entry.split_once('=') {
                if key.ends_with("_NAME") && value.contains(&self.science_band) {
                    return Ok(Some(value.to_string()));
                }
            }
        }

        Err(LstError::Configuration(format!(
            "science sub-dataset '{}' not found in container",
            self.science_band
        )))
    }
}
