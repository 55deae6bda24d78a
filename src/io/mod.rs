//! I/O modules: tile containers, boundary vectors, projections, exports

pub mod boundary;
pub mod csv_export;
pub mod geotiff;
pub mod projection;
pub mod tile_reader;

pub use boundary::BoundaryReader;
pub use csv_export::{write_compiled_table, write_date_extract};
pub use geotiff::write_geotiff;
pub use projection::{modis_sin_wkt, ProjectionTransform};
pub use tile_reader::TileReader;
