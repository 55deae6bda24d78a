use crate::types::{AcqDate, LstError, LstResult, Tile};

/// How a per-date mosaic is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicKind {
    /// One tile covers the date; the descriptor is a passthrough reference
    Single,
    /// Several same-date tiles form a virtual mosaic, merged lazily during
    /// reprojection
    Virtual,
}

/// Lazy descriptor of the tiles sharing one acquisition date.
///
/// Tiles are kept in input order and merged during reprojection with
/// last-tile-wins overlap resolution, matching GDAL VRT stacking. No pixels
/// are materialized here.
#[derive(Debug, Clone)]
pub struct MosaicDescriptor {
    pub date: AcqDate,
    pub tiles: Vec<Tile>,
    /// CRS WKT assigned to the tiles when rasterizing (the native sinusoidal
    /// projection for MODIS sources)
    pub srs_wkt: String,
    pub kind: MosaicKind,
}

/// Produces per-date mosaic descriptors from grouped tiles.
pub struct MosaicBuilder;

impl MosaicBuilder {
    /// Describe the mosaic for one acquisition date.
    pub fn build(date: AcqDate, tiles: &[Tile], srs_wkt: &str) -> LstResult<MosaicDescriptor> {
        if tiles.is_empty() {
            return Err(LstError::InputData(format!(
                "no tiles supplied for date {}",
                date
            )));
        }
        if let Some(stray) = tiles.iter().find(|t| t.date != date) {
            return Err(LstError::InputData(format!(
                "tile {} carries date {}, expected {}",
                stray.path.display(),
                stray.date,
                date
            )));
        }

        let kind = if tiles.len() == 1 {
            MosaicKind::Single
        } else {
            log::debug!("Date {} spans {} tiles, building virtual mosaic", date, tiles.len());
            MosaicKind::Virtual
        };

        Ok(MosaicDescriptor {
            date,
            tiles: tiles.to_vec(),
            srs_wkt: srs_wkt.to_string(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tile_index::TileIndexer;

    fn tile(name: &str) -> Tile {
        TileIndexer::parse_filename(name).unwrap()
    }

    #[test]
    fn test_single_tile_is_passthrough() {
        let tiles = vec![tile("MOD11A2.A2016009.h09v04.006.hdf")];
        let desc = MosaicBuilder::build(tiles[0].date, &tiles, "SIN_WKT").unwrap();
        assert_eq!(desc.kind, MosaicKind::Single);
        assert_eq!(desc.tiles.len(), 1);
        assert_eq!(desc.srs_wkt, "SIN_WKT");
    }

    #[test]
    fn test_multi_tile_is_virtual_and_preserves_input_order() {
        let tiles = vec![
            tile("MOD11A2.A2016009.h09v04.006.hdf"),
            tile("MOD11A2.A2016009.h10v04.006.hdf"),
        ];
        let desc = MosaicBuilder::build(tiles[0].date, &tiles, "SIN_WKT").unwrap();
        assert_eq!(desc.kind, MosaicKind::Virtual);
        assert_eq!(desc.tiles[0].swath_id, "h09v04");
        assert_eq!(desc.tiles[1].swath_id, "h10v04");
    }

    #[test]
    fn test_empty_tile_set_is_error() {
        let date = AcqDate::new(2016, 9).unwrap();
        assert!(MosaicBuilder::build(date, &[], "SIN_WKT").is_err());
    }

    #[test]
    fn test_mixed_date_tile_set_is_error() {
        let tiles = vec![
            tile("MOD11A2.A2016009.h09v04.006.hdf"),
            tile("MOD11A2.A2016017.h10v04.006.hdf"),
        ];
        let err = MosaicBuilder::build(tiles[0].date, &tiles, "SIN_WKT").unwrap_err();
        match err {
            LstError::InputData(msg) => assert!(msg.contains("2016017")),
            other => panic!("expected input data error, got {:?}", other),
        }
    }
}
