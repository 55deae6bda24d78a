use crate::types::{AcqDate, LstError, LstResult, Tile};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Groups raw tile captures by acquisition date and detects which dates
/// need mosaicking because more than one swath was captured.
pub struct TileIndexer;

/// Per-date grouping of tiles, sorted ascending by acquisition date.
#[derive(Debug, Clone)]
pub struct TileIndex {
    /// Tiles grouped by date; iteration order is chronological
    pub groups: BTreeMap<AcqDate, Vec<Tile>>,
    /// Dates captured by more than one swath (mosaic candidates), sorted
    pub mosaic_dates: Vec<AcqDate>,
}

impl TileIndexer {
    /// Parse a MODIS-style filename of the form
    /// `<product>.A<year><doy>.<tile-id>.<version>.<ext>`.
    pub fn parse_filename<P: AsRef<Path>>(path: P) -> LstResult<Tile> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                LstError::InputData(format!("unreadable tile filename: {}", path.display()))
            })?;

        let pattern = Regex::new(
            r"^(?P<product>[A-Za-z0-9_]+)\.A(?P<token>\d{7})\.(?P<swath>[A-Za-z0-9]+)\.(?P<version>[A-Za-z0-9]+)\.[A-Za-z0-9]+$",
        )
        .expect("tile filename pattern is valid");

        let captures = pattern.captures(name).ok_or_else(|| {
            LstError::InputData(format!("filename does not match MODIS schema: '{}'", name))
        })?;

        let date = AcqDate::parse_token(&captures["token"])?;

        Ok(Tile {
            path: path.to_path_buf(),
            product: captures["product"].to_string(),
            date,
            swath_id: captures["swath"].to_string(),
            version: captures["version"].to_string(),
        })
    }

    /// Group tiles by acquisition date.
    ///
    /// With `swath_count > 1`, dates that appear more than once are flagged
    /// as mosaic candidates. With a single swath every date must map to
    /// exactly one tile; a duplicate date is then an input error rather than
    /// a mosaic.
    pub fn group_by_date(tiles: &[Tile], swath_count: usize) -> LstResult<TileIndex> {
        if tiles.is_empty() {
            return Err(LstError::InputData("tile list is empty".to_string()));
        }

        let mut groups: BTreeMap<AcqDate, Vec<Tile>> = BTreeMap::new();
        for tile in tiles {
            groups.entry(tile.date).or_default().push(tile.clone());
        }

        let mosaic_dates: Vec<AcqDate> = if swath_count > 1 {
            groups
                .iter()
                .filter(|(_, tiles)| tiles.len() > 1)
                .map(|(date, _)| *date)
                .collect()
        } else {
            if let Some((date, tiles)) = groups.iter().find(|(_, t)| t.len() > 1) {
                return Err(LstError::InputData(format!(
                    "date {} appears on {} tiles but only one swath is configured",
                    date,
                    tiles.len()
                )));
            }
            Vec::new()
        };

        log::info!(
            "📅 Indexed {} tiles into {} acquisition dates ({} need mosaicking)",
            tiles.len(),
            groups.len(),
            mosaic_dates.len()
        );

        Ok(TileIndex {
            groups,
            mosaic_dates,
        })
    }
}
