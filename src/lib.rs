//! lstprep: A Fast, Modular MODIS Land Surface Temperature Preprocessor
//!
//! This library ingests multi-tile MODIS LST captures, assembles them into
//! per-acquisition-date mosaics aligned to a drainage-boundary vector
//! dataset, samples the result into a per-grid-cell time series table, and
//! fills gaps in that series over time. The clean, gap-filled table is the
//! input a stream-temperature modeling stage consumes.

pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AcqDate, Boundary, BoundingBox, CellId, CellSample, CellSeries, ClippedRaster, GeoTransform,
    LstError, LstResult, Tile, TileBand, DEFAULT_NODATA,
};

pub use crate::core::{
    DateSamples, LoadedMosaic, LstTable, MosaicBuilder, MosaicDescriptor, MosaicKind, RasterSampler,
    ReprojectClip, ResampleMethod, TableCompiler, TemporalInterpolator, TileIndex, TileIndexer,
    WarpParams,
};

pub use io::{BoundaryReader, TileReader};
pub use pipeline::{LstPipeline, PipelineConfig, RunReport};
