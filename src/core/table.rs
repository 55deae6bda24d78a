use crate::types::{
    AcqDate, CellId, CellSample, CellSeries, GeoTransform, LstError, LstResult,
};
use std::collections::BTreeMap;

/// Output grid of one processed date, used to verify that cell identities
/// are comparable across dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRef {
    pub origin: (f64, f64),
    pub resolution: (f64, f64),
}

impl GridRef {
    pub fn from_geo_transform(gt: &GeoTransform) -> Self {
        GridRef {
            origin: (gt.top_left_x, gt.top_left_y),
            resolution: (gt.pixel_width, gt.pixel_height),
        }
    }

    /// Whether two grids agree within `tolerance` on origin and resolution.
    pub fn matches(&self, other: &GridRef, tolerance: f64) -> bool {
        (self.origin.0 - other.origin.0).abs() <= tolerance
            && (self.origin.1 - other.origin.1).abs() <= tolerance
            && (self.resolution.0 - other.resolution.0).abs() <= tolerance
            && (self.resolution.1 - other.resolution.1).abs() <= tolerance
    }
}

/// Point samples extracted for one acquisition date.
#[derive(Debug, Clone)]
pub struct DateSamples {
    pub date: AcqDate,
    pub grid: GridRef,
    pub samples: Vec<CellSample>,
}

/// The compiled per-cell time series table: one row per observed cell
/// identity, one value column per acquisition date, in ascending date order.
#[derive(Debug, Clone)]
pub struct LstTable {
    pub dates: Vec<AcqDate>,
    pub cells: BTreeMap<CellId, CellSeries>,
}

impl LstTable {
    /// Total column count of the exported table: `cell_id, X, Y` plus one
    /// column per date.
    pub fn column_count(&self) -> usize {
        self.dates.len() + 3
    }
}

/// Joins per-date point samples into one table keyed by stable cell
/// identity.
pub struct TableCompiler {
    tolerance: f64,
}

impl Default for TableCompiler {
    fn default() -> Self {
        TableCompiler { tolerance: 1e-6 }
    }
}

impl TableCompiler {
    pub fn new(tolerance: f64) -> Self {
        TableCompiler { tolerance }
    }

    /// Merge per-date samples into per-cell series.
    ///
    /// The join is keyed by quantized cell identity, never by row position:
    /// dates with different valid-cell masks (clouds, edge effects) simply
    /// leave gaps. The first date's grid is the reference; any date whose
    /// origin or resolution disagrees fails with an alignment error because
    /// cell identities are meaningless without a common grid.
    pub fn merge_series(&self, samples_by_date: &[DateSamples]) -> LstResult<LstTable> {
        if samples_by_date.is_empty() {
            return Err(LstError::InputData(
                "no per-date samples to compile".to_string(),
            ));
        }

        let mut sorted: Vec<&DateSamples> = samples_by_date.iter().collect();
        sorted.sort_by_key(|d| d.date);

        let reference = sorted[0].grid;
        for date_samples in &sorted[1..] {
            if !reference.matches(&date_samples.grid, self.tolerance) {
                return Err(LstError::Alignment(format!(
                    "grid for date {} (origin {:?}, resolution {:?}) disagrees with the \
                     reference grid (origin {:?}, resolution {:?})",
                    date_samples.date,
                    date_samples.grid.origin,
                    date_samples.grid.resolution,
                    reference.origin,
                    reference.resolution,
                )));
            }
        }

        let dates: Vec<AcqDate> = sorted.iter().map(|d| d.date).collect();
        let mut cells: BTreeMap<CellId, CellSeries> = BTreeMap::new();

        for (index, date_samples) in sorted.iter().enumerate() {
            for sample in &date_samples.samples {
                let series = cells.entry(sample.cell_id).or_insert_with(|| CellSeries {
                    cell_id: sample.cell_id,
                    x: sample.x,
                    y: sample.y,
                    values: vec![None; dates.len()],
                });
                series.values[index] = Some(sample.value);
            }
        }

        log::info!(
            "🧩 Compiled table: {} cells across {} dates",
            cells.len(),
            dates.len()
        );

        Ok(LstTable { dates, cells })
    }
}
