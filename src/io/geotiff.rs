use crate::types::{ClippedRaster, LstResult};
use gdal::raster::Buffer;
use gdal::DriverManager;
use std::path::Path;

/// Write a clipped raster to a single-band Float32 GeoTIFF.
pub fn write_geotiff<P: AsRef<Path>>(path: P, raster: &ClippedRaster) -> LstResult<()> {
    let path = path.as_ref();
    let (rows, cols) = raster.data.dim();
    log::debug!(
        "Writing {}x{} clipped raster for date {} to {}",
        rows,
        cols,
        raster.date,
        path.display()
    );

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut dataset =
        driver.create_with_band_type::<f32, _>(path, cols, rows, 1)?;
    dataset.set_geo_transform(&raster.geo_transform.to_gdal())?;
    dataset.set_projection(&raster.crs_wkt)?;

    let mut band = dataset.rasterband(1)?;
    band.set_no_data_value(Some(raster.nodata as f64))?;

    let data: Vec<f32> = raster.data.iter().copied().collect();
    let mut buffer = Buffer::new((cols, rows), data);
    band.write((0, 0), (cols, rows), &mut buffer)?;

    dataset.flush_cache();
    Ok(())
}
