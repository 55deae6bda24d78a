use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Real-valued LST raster grid (rows x cols)
pub type LstGrid = Array2<f32>;

/// Default no-data sentinel written into warped rasters.
///
/// Must stay distinct from any legitimate science value so that "missing"
/// is always distinguishable from a valid zero.
pub const DEFAULT_NODATA: f32 = -999.0;

/// Acquisition date as year plus ordinal day-of-year, e.g. `2016009`.
///
/// Ordering is chronological: by year, then day-of-year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AcqDate {
    pub year: u16,
    pub doy: u16,
}

impl AcqDate {
    /// Build a date from its parts, validating the day-of-year against the
    /// calendar (leap years included).
    pub fn new(year: u16, doy: u16) -> LstResult<Self> {
        NaiveDate::from_yo_opt(year as i32, doy as u32).ok_or_else(|| {
            LstError::InputData(format!("invalid acquisition date: year {} doy {}", year, doy))
        })?;
        Ok(AcqDate { year, doy })
    }

    /// Parse the 7-digit `<year><doy>` token embedded in MODIS filenames.
    pub fn parse_token(token: &str) -> LstResult<Self> {
        if token.len() != 7 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LstError::InputData(format!(
                "malformed acquisition date token: '{}'",
                token
            )));
        }
        let year: u16 = token[0..4].parse().map_err(|_| {
            LstError::InputData(format!("malformed acquisition date token: '{}'", token))
        })?;
        let doy: u16 = token[4..7].parse().map_err(|_| {
            LstError::InputData(format!("malformed acquisition date token: '{}'", token))
        })?;
        AcqDate::new(year, doy)
    }
}

impl std::fmt::Display for AcqDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:03}", self.year, self.doy)
    }
}

/// One satellite swath capture on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Path to the source container (HDF or single-band raster)
    pub path: PathBuf,
    /// Product short name, e.g. "MOD11A2"
    pub product: String,
    /// Acquisition date parsed from the filename
    pub date: AcqDate,
    /// Swath identifier, e.g. "h09v04"
    pub swath_id: String,
    /// Collection version token, e.g. "006"
    pub version: String,
}

/// Geospatial transformation parameters (GDAL affine convention)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        GeoTransform {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Center coordinates of the pixel at (row, col).
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.top_left_x + col as f64 * self.pixel_width + self.pixel_width / 2.0;
        let y = self.top_left_y + row as f64 * self.pixel_height + self.pixel_height / 2.0;
        (x, y)
    }
}

/// Extent envelope in a projected CRS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Drainage-boundary vector dataset: clip geometry, extent envelope and the
/// CRS that every downstream raster inherits.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub geometry: geo::MultiPolygon<f64>,
    pub bbox: BoundingBox,
    pub crs_wkt: String,
}

/// Science band read out of one tile container.
#[derive(Debug, Clone)]
pub struct TileBand {
    pub data: LstGrid,
    pub geo_transform: GeoTransform,
    pub projection: String,
    pub nodata: Option<f32>,
}

/// A mosaic reprojected into the boundary CRS, resampled and clipped to the
/// boundary extent.
#[derive(Debug, Clone)]
pub struct ClippedRaster {
    pub date: AcqDate,
    pub data: LstGrid,
    pub geo_transform: GeoTransform,
    pub nodata: f32,
    pub crs_wkt: String,
}

impl ClippedRaster {
    /// Output pixel resolution as (x, y); y is negative for north-up grids.
    pub fn resolution(&self) -> (f64, f64) {
        (self.geo_transform.pixel_width, self.geo_transform.pixel_height)
    }
}

/// Stable cell identity, quantized from pixel-center coordinates at the
/// output resolution. Identical across dates as long as the grids align.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellId {
    pub qx: i64,
    pub qy: i64,
}

impl CellId {
    /// Quantize a pixel-center coordinate against the output resolution.
    pub fn quantize(x: f64, y: f64, res_x: f64, res_y: f64) -> Self {
        CellId {
            qx: (x / res_x).round() as i64,
            qy: (y / res_y).round() as i64,
        }
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.qx, self.qy)
    }
}

/// One valid pixel extracted from a clipped raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub cell_id: CellId,
    pub x: f64,
    pub y: f64,
    pub value: f32,
    pub date: AcqDate,
}

/// All samples for one cell identity across the run's date axis.
///
/// `values` is parallel to the owning table's sorted date list; `None` marks
/// a date on which the cell had no valid measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSeries {
    pub cell_id: CellId,
    pub x: f64,
    pub y: f64,
    pub values: Vec<Option<f32>>,
}

/// Error types for LST preprocessing
#[derive(Debug, thiserror::Error)]
pub enum LstError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("input data error: {0}")]
    InputData(String),

    #[error("grid alignment error: {0}")]
    Alignment(String),

    #[error("interpolation error: {0}")]
    Interpolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for LST preprocessing operations
pub type LstResult<T> = Result<T, LstError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acq_date_token_roundtrip() {
        let date = AcqDate::parse_token("2016009").unwrap();
        assert_eq!(date.year, 2016);
        assert_eq!(date.doy, 9);
        assert_eq!(date.to_string(), "2016009");
    }

    #[test]
    fn test_acq_date_rejects_malformed_tokens() {
        assert!(AcqDate::parse_token("201609").is_err());
        assert!(AcqDate::parse_token("2016x09").is_err());
        assert!(AcqDate::parse_token("2016400").is_err());
        assert!(AcqDate::parse_token("").is_err());
    }

    #[test]
    fn test_acq_date_leap_year() {
        assert!(AcqDate::new(2016, 366).is_ok());
        assert!(AcqDate::new(2017, 366).is_err());
    }

    #[test]
    fn test_acq_date_ordering_is_chronological() {
        let mut dates = vec![
            AcqDate::new(2016, 17).unwrap(),
            AcqDate::new(2015, 361).unwrap(),
            AcqDate::new(2016, 1).unwrap(),
        ];
        dates.sort();
        assert_eq!(dates[0].year, 2015);
        assert_eq!(dates[1], AcqDate::new(2016, 1).unwrap());
        assert_eq!(dates[2], AcqDate::new(2016, 17).unwrap());
    }

    #[test]
    fn test_cell_id_stable_across_quantization() {
        let a = CellId::quantize(500.0, -1500.0, 1000.0, -1000.0);
        let b = CellId::quantize(500.0000001, -1500.0000001, 1000.0, -1000.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pixel_center_convention() {
        let gt = GeoTransform {
            top_left_x: 100.0,
            pixel_width: 10.0,
            rotation_x: 0.0,
            top_left_y: 200.0,
            rotation_y: 0.0,
            pixel_height: -10.0,
        };
        let (x, y) = gt.pixel_center(0, 0);
        assert_eq!(x, 105.0);
        assert_eq!(y, 195.0);
        let (x, y) = gt.pixel_center(2, 3);
        assert_eq!(x, 135.0);
        assert_eq!(y, 175.0);
    }
}
