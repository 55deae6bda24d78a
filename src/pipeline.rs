use crate::core::reproject::{LoadedMosaic, ReprojectClip, ResampleMethod, WarpParams};
use crate::core::table::{DateSamples, GridRef, TableCompiler};
use crate::core::{MosaicBuilder, RasterSampler, TemporalInterpolator, TileIndexer};
use crate::io::projection::{modis_sin_wkt, ProjectionTransform};
use crate::io::{self, BoundaryReader, TileReader};
use crate::types::{
    AcqDate, Boundary, CellId, CellSample, LstError, LstResult, Tile, DEFAULT_NODATA,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_science_band() -> String {
    "LST_Day_1km".to_string()
}

fn default_nodata() -> f32 {
    DEFAULT_NODATA
}

fn default_blend_pixels() -> usize {
    5
}

/// Explicit configuration for one pipeline run. Replaces the module-level
/// globals of the legacy tooling; no ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the downloaded tile containers
    pub tile_dir: PathBuf,
    /// Drainage-boundary Shapefile (with .prj sidecar)
    pub boundary_path: PathBuf,
    /// Directory receiving per-date rasters, extracts and the final table
    pub output_dir: PathBuf,
    /// Configured swath identifiers, e.g. ["h09v04", "h10v04"]
    pub swath_ids: Vec<String>,
    /// Science sub-dataset selected from each tile container
    #[serde(default = "default_science_band")]
    pub science_band: String,
    /// Output resolution (x, y); defaults to the source tile resolution
    #[serde(default)]
    pub target_resolution: Option<(f64, f64)>,
    #[serde(default = "default_nodata")]
    pub nodata: f32,
    #[serde(default = "default_blend_pixels")]
    pub blend_pixels: usize,
    #[serde(default)]
    pub resample: ResampleMethod,
}

/// Outcome of one pipeline run, enumerating everything that was skipped and
/// why. A run never concludes with a silent empty output.
#[derive(Debug)]
pub struct RunReport {
    pub dates_processed: Vec<AcqDate>,
    pub dates_skipped: Vec<(AcqDate, String)>,
    /// Tile files whose names could not be parsed and were left out of
    /// indexing
    pub files_skipped: Vec<(PathBuf, String)>,
    pub cells_excluded: Vec<(CellId, String)>,
    pub cell_count: usize,
    pub table_path: PathBuf,
}

struct DateProduct {
    date: AcqDate,
    grid: GridRef,
    samples: Vec<CellSample>,
}

/// End-to-end preprocessing pipeline: index tiles, mosaic per date, warp and
/// clip to the boundary, sample, compile the table and fill gaps.
pub struct LstPipeline {
    config: PipelineConfig,
}

impl LstPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        LstPipeline { config }
    }

    /// Run the full pipeline.
    ///
    /// Global failures (unreadable boundary, no tiles, unresolvable
    /// projection) abort immediately. Per-date failures are logged, reported
    /// and excluded from aggregation while the run continues.
    pub fn run(&self) -> LstResult<RunReport> {
        log::info!("🌡️  Starting LST preprocessing run");

        let boundary = BoundaryReader::read(&self.config.boundary_path)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let (tiles, files_skipped) = self.scan_tiles()?;
        let index = TileIndexer::group_by_date(&tiles, self.config.swath_ids.len())?;

        let reader = TileReader::new(&self.config.science_band);
        let resolution = self.resolve_resolution(&reader, &tiles)?;
        let warp = ReprojectClip::new(WarpParams {
            resolution,
            nodata: self.config.nodata,
            blend_pixels: self.config.blend_pixels,
            resample: self.config.resample,
        });

        // Per-date mosaic, warp and sampling are independent across dates
        let groups: Vec<(AcqDate, Vec<Tile>)> = index
            .groups
            .iter()
            .map(|(date, tiles)| (*date, tiles.clone()))
            .collect();
        let outcomes: Vec<(AcqDate, LstResult<DateProduct>)> = groups
            .par_iter()
            .map(|(date, date_tiles)| {
                (
                    *date,
                    self.process_date(*date, date_tiles, &boundary, &reader, &warp),
                )
            })
            .collect();

        let mut products: Vec<DateProduct> = Vec::new();
        let mut dates_skipped: Vec<(AcqDate, String)> = Vec::new();
        for (date, outcome) in outcomes {
            match outcome {
                Ok(product) => products.push(product),
                Err(e) => {
                    log::warn!("Skipping date {}: {}", date, e);
                    dates_skipped.push((date, e.to_string()));
                }
            }
        }

        if products.is_empty() {
            return Err(LstError::InputData(
                "no acquisition date could be processed".to_string(),
            ));
        }

        // Alignment pre-check against the first processed date, so one bad
        // grid skips a date instead of failing the compile
        let reference = products[0].grid;
        products.retain(|product| {
            if reference.matches(&product.grid, 1e-6) {
                true
            } else {
                log::warn!("Skipping date {}: grid misaligned with reference", product.date);
                dates_skipped.push((
                    product.date,
                    LstError::Alignment("grid disagrees with reference grid".to_string())
                        .to_string(),
                ));
                false
            }
        });

        let samples_by_date: Vec<DateSamples> = products
            .iter()
            .map(|product| DateSamples {
                date: product.date,
                grid: product.grid,
                samples: product.samples.clone(),
            })
            .collect();
        let table = TableCompiler::default().merge_series(&samples_by_date)?;

        // Per-cell gap filling, parallel once the table barrier is reached
        let interpolator = TemporalInterpolator::new(self.config.nodata);
        let (filled, cells_excluded) = interpolator.fill_table(&table);

        let table_path = self
            .config
            .output_dir
            .join(format!("LST_{}.csv", filled.dates[0].year));
        io::write_compiled_table(&table_path, &filled)?;

        let report = RunReport {
            dates_processed: filled.dates.clone(),
            dates_skipped,
            files_skipped,
            cells_excluded,
            cell_count: filled.cells.len(),
            table_path,
        };
        self.log_summary(&report);
        Ok(report)
    }

    /// List tile containers in the input directory and parse their names.
    ///
    /// An unparseable filename skips that file, not the run; only an empty
    /// result after scanning aborts.
    fn scan_tiles(&self) -> LstResult<(Vec<Tile>, Vec<(PathBuf, String)>)> {
        let mut tiles = Vec::new();
        let mut skipped = Vec::new();
        for entry in std::fs::read_dir(&self.config.tile_dir)? {
            let path = entry?.path();
            let is_tile = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("hdf") || e.eq_ignore_ascii_case("tif"))
                .unwrap_or(false);
            if !is_tile {
                continue;
            }
            match TileIndexer::parse_filename(&path) {
                Ok(tile) => tiles.push(tile),
                Err(e) => {
                    log::warn!("Skipping tile file {}: {}", path.display(), e);
                    skipped.push((path, e.to_string()));
                }
            }
        }
        if tiles.is_empty() {
            return Err(LstError::InputData(format!(
                "no parseable tile files found in {}",
                self.config.tile_dir.display()
            )));
        }
        Ok((tiles, skipped))
    }

    /// Target resolution: configured value, or the first tile's native pixel
    /// size in its source projection.
    fn resolve_resolution(
        &self,
        reader: &TileReader,
        tiles: &[Tile],
    ) -> LstResult<(f64, f64)> {
        if let Some(resolution) = self.config.target_resolution {
            return Ok(resolution);
        }
        let band = reader.read(&tiles[0])?;
        Ok((
            band.geo_transform.pixel_width,
            band.geo_transform.pixel_height.abs(),
        ))
    }

    /// Mosaic, warp, clip and sample one acquisition date.
    fn process_date(
        &self,
        date: AcqDate,
        tiles: &[Tile],
        boundary: &Boundary,
        reader: &TileReader,
        warp: &ReprojectClip,
    ) -> LstResult<DateProduct> {
        let descriptor = MosaicBuilder::build(date, tiles, modis_sin_wkt())?;

        let mut bands = Vec::with_capacity(descriptor.tiles.len());
        for tile in &descriptor.tiles {
            bands.push(reader.read(tile)?);
        }

        // Tiles without an embedded CRS fall back to the assigned source WKT
        let src_wkt = bands
            .iter()
            .find(|band| !band.projection.is_empty())
            .map(|band| band.projection.clone())
            .unwrap_or_else(|| descriptor.srs_wkt.clone());
        let to_source = ProjectionTransform::new(&boundary.crs_wkt, &src_wkt)?;

        let mosaic = LoadedMosaic { descriptor, bands };
        let clipped = warp.transform(&mosaic, boundary, &to_source)?;

        let raster_path = self.date_path(date, "reprj.tif");
        io::write_geotiff(&raster_path, &clipped)?;

        let samples: Vec<CellSample> = RasterSampler::extract_points(&clipped).collect();
        io::write_date_extract(self.date_path(date, "xyz.csv"), &samples)?;

        log::info!(
            "✅ Date {}: {} tiles warped, {} valid cells",
            date,
            mosaic.bands.len(),
            samples.len()
        );

        Ok(DateProduct {
            date,
            grid: GridRef::from_geo_transform(&clipped.geo_transform),
            samples,
        })
    }

    fn date_path(&self, date: AcqDate, suffix: &str) -> PathBuf {
        self.config.output_dir.join(format!("{}_{}", date, suffix))
    }

    fn log_summary(&self, report: &RunReport) {
        log::info!(
            "🏁 Run complete: {} dates compiled, {} cells in {}",
            report.dates_processed.len(),
            report.cell_count,
            report.table_path.display()
        );
        for (path, reason) in &report.files_skipped {
            log::warn!("Skipped file {}: {}", path.display(), reason);
        }
        for (date, reason) in &report.dates_skipped {
            log::warn!("Skipped date {}: {}", date, reason);
        }
        for (cell_id, reason) in &report.cells_excluded {
            log::warn!("Excluded cell {}: {}", cell_id, reason);
        }
    }
}

impl RunReport {
    /// Human-readable summary of skipped dates and excluded cells.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} dates compiled, {} skipped; {} cells written, {} excluded",
            self.dates_processed.len(),
            self.dates_skipped.len(),
            self.cell_count,
            self.cells_excluded.len(),
        )];
        for (path, reason) in &self.files_skipped {
            lines.push(format!("skipped file {}: {}", path.display(), reason));
        }
        for (date, reason) in &self.dates_skipped {
            lines.push(format!("skipped {}: {}", date, reason));
        }
        for (cell_id, reason) in &self.cells_excluded {
            lines.push(format!("excluded {}: {}", cell_id, reason));
        }
        lines.join("\n")
    }
}
