use crate::core::mosaic::MosaicDescriptor;
use crate::types::{
    Boundary, ClippedRaster, GeoTransform, LstError, LstGrid, LstResult, TileBand,
};
use geo::{Contains, Distance, Euclidean, Point};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Resampling kernel applied during reprojection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleMethod {
    /// Bilinear interpolation over the four surrounding source pixels
    Bilinear,
    /// Nearest source pixel
    Nearest,
}

impl Default for ResampleMethod {
    fn default() -> Self {
        ResampleMethod::Bilinear
    }
}

/// Parameters controlling the warp/clip stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpParams {
    /// Output pixel size (x, y), both positive, in boundary CRS units
    pub resolution: (f64, f64),
    /// Explicit no-data sentinel written into clipped cells
    pub nodata: f32,
    /// Width in pixels of the cutline feather; pixels outside the boundary
    /// polygon but within this distance of its edge still receive values
    pub blend_pixels: usize,
    pub resample: ResampleMethod,
}

impl WarpParams {
    pub fn new(resolution: (f64, f64)) -> Self {
        WarpParams {
            resolution,
            nodata: crate::types::DEFAULT_NODATA,
            blend_pixels: 5,
            resample: ResampleMethod::default(),
        }
    }
}

/// Coordinate transform from the boundary CRS into a mosaic's source CRS.
///
/// The GDAL-backed implementation lives in `io::projection`; tests inject
/// [`IdentityTransform`] to warp within a single CRS.
pub trait CrsTransform {
    /// Transform the given coordinate arrays in place.
    fn transform_coords(&self, xs: &mut [f64], ys: &mut [f64]) -> LstResult<()>;
}

/// No-op transform for mosaics already in the boundary CRS.
pub struct IdentityTransform;

impl CrsTransform for IdentityTransform {
    fn transform_coords(&self, _xs: &mut [f64], _ys: &mut [f64]) -> LstResult<()> {
        Ok(())
    }
}

/// A mosaic descriptor together with its materialized science bands, in the
/// descriptor's tile order.
#[derive(Debug)]
pub struct LoadedMosaic {
    pub descriptor: MosaicDescriptor,
    pub bands: Vec<TileBand>,
}

/// Reprojects a per-date mosaic into the boundary CRS, resamples it to the
/// target resolution and clips it to the boundary polygon.
pub struct ReprojectClip {
    params: WarpParams,
}

impl ReprojectClip {
    pub fn new(params: WarpParams) -> Self {
        ReprojectClip { params }
    }

    pub fn params(&self) -> &WarpParams {
        &self.params
    }

    /// Warp a loaded mosaic onto the boundary grid.
    ///
    /// Each output pixel center is inverse-mapped through `to_source` into
    /// the mosaic CRS and sampled from the tiles in merge order (last tile
    /// wins in overlaps). Pixels outside the cutline feather get the no-data
    /// sentinel.
    pub fn transform(
        &self,
        mosaic: &LoadedMosaic,
        boundary: &Boundary,
        to_source: &dyn CrsTransform,
    ) -> LstResult<ClippedRaster> {
        if mosaic.bands.is_empty() {
            return Err(LstError::InputData(format!(
                "mosaic for date {} has no loaded bands",
                mosaic.descriptor.date
            )));
        }
        for band in &mosaic.bands {
            let gt = &band.geo_transform;
            if gt.rotation_x != 0.0 || gt.rotation_y != 0.0 {
                return Err(LstError::Configuration(
                    "rotated source grids are not supported".to_string(),
                ));
            }
        }

        let (res_x, res_y) = self.params.resolution;
        if res_x <= 0.0 || res_y <= 0.0 {
            return Err(LstError::Configuration(format!(
                "target resolution must be positive, got ({}, {})",
                res_x, res_y
            )));
        }

        let bbox = &boundary.bbox;
        let cols = (((bbox.max_x - bbox.min_x) / res_x).ceil() as usize).max(1);
        let rows = (((bbox.max_y - bbox.min_y) / res_y).ceil() as usize).max(1);

        let geo_transform = GeoTransform {
            top_left_x: bbox.min_x,
            pixel_width: res_x,
            rotation_x: 0.0,
            top_left_y: bbox.max_y,
            rotation_y: 0.0,
            pixel_height: -res_y,
        };

        log::debug!(
            "Warping date {} onto {}x{} grid at ({}, {})",
            mosaic.descriptor.date,
            rows,
            cols,
            res_x,
            res_y
        );

        let blend_dist = self.params.blend_pixels as f64 * res_x;
        let mut data: LstGrid = Array2::from_elem((rows, cols), self.params.nodata);

        let col_centers: Vec<f64> = (0..cols)
            .map(|c| geo_transform.top_left_x + (c as f64 + 0.5) * res_x)
            .collect();

        for r in 0..rows {
            let y = geo_transform.top_left_y - (r as f64 + 0.5) * res_y;

            // Cutline test happens in the boundary CRS, before warping
            let mask: Vec<bool> = col_centers
                .iter()
                .map(|&x| self.inside_cutline(boundary, x, y, blend_dist))
                .collect();
            if !mask.iter().any(|&m| m) {
                continue;
            }

            let mut xs = col_centers.clone();
            let mut ys = vec![y; cols];
            to_source.transform_coords(&mut xs, &mut ys)?;

            for c in 0..cols {
                if !mask[c] {
                    continue;
                }
                if let Some(value) = self.sample_mosaic(&mosaic.bands, xs[c], ys[c]) {
                    data[[r, c]] = value;
                }
            }
        }

        Ok(ClippedRaster {
            date: mosaic.descriptor.date,
            data,
            geo_transform,
            nodata: self.params.nodata,
            crs_wkt: boundary.crs_wkt.clone(),
        })
    }

    fn inside_cutline(&self, boundary: &Boundary, x: f64, y: f64, blend_dist: f64) -> bool {
        let point = Point::new(x, y);
        if boundary.geometry.contains(&point) {
            return true;
        }
        if blend_dist > 0.0 {
            return Euclidean.distance(&point, &boundary.geometry) <= blend_dist;
        }
        false
    }

    /// Sample the mosaic tiles in merge order; the last tile covering the
    /// point wins.
    fn sample_mosaic(&self, bands: &[TileBand], x: f64, y: f64) -> Option<f32> {
        let mut value = None;
        for band in bands {
            if let Some(v) = sample_band(band, x, y, self.params.resample) {
                value = Some(v);
            }
        }
        value
    }
}

/// Sample one source band at a source-CRS coordinate.
fn sample_band(band: &TileBand, x: f64, y: f64, method: ResampleMethod) -> Option<f32> {
    let gt = &band.geo_transform;
    let (rows, cols) = band.data.dim();
    let col_f = (x - gt.top_left_x) / gt.pixel_width - 0.5;
    let row_f = (y - gt.top_left_y) / gt.pixel_height - 0.5;

    match method {
        ResampleMethod::Nearest => {
            let c = col_f.round();
            let r = row_f.round();
            if c < 0.0 || r < 0.0 || c as usize >= cols || r as usize >= rows {
                return None;
            }
            band_value(band, r as usize, c as usize)
        }
        ResampleMethod::Bilinear => {
            let c0 = col_f.floor();
            let r0 = row_f.floor();
            let fx = col_f - c0;
            let fy = row_f - r0;

            let mut sum = 0.0f64;
            let mut weight_sum = 0.0f64;
            for (dr, dc, w) in [
                (0, 0, (1.0 - fy) * (1.0 - fx)),
                (0, 1, (1.0 - fy) * fx),
                (1, 0, fy * (1.0 - fx)),
                (1, 1, fy * fx),
            ] {
                let r = r0 + dr as f64;
                let c = c0 + dc as f64;
                if r < 0.0 || c < 0.0 || r as usize >= rows || c as usize >= cols {
                    continue;
                }
                if let Some(v) = band_value(band, r as usize, c as usize) {
                    sum += v as f64 * w;
                    weight_sum += w;
                }
            }
            if weight_sum <= f64::EPSILON {
                None
            } else {
                Some((sum / weight_sum) as f32)
            }
        }
    }
}

fn band_value(band: &TileBand, row: usize, col: usize) -> Option<f32> {
    let v = band.data[[row, col]];
    match band.nodata {
        Some(nd) if v == nd => None,
        _ => Some(v),
    }
}
