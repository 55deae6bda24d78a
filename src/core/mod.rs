//! Core LST preprocessing modules

pub mod interpolate;
pub mod mosaic;
pub mod reproject;
pub mod sampler;
pub mod table;
pub mod tile_index;

// Re-export main types
pub use interpolate::TemporalInterpolator;
pub use mosaic::{MosaicBuilder, MosaicDescriptor, MosaicKind};
pub use reproject::{
    CrsTransform, IdentityTransform, LoadedMosaic, ReprojectClip, ResampleMethod, WarpParams,
};
pub use sampler::{RasterSampler, SamplePoints};
pub use table::{DateSamples, GridRef, LstTable, TableCompiler};
pub use tile_index::{TileIndex, TileIndexer};
