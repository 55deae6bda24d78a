use crate::core::table::LstTable;
use crate::types::{CellId, CellSeries, LstError, LstResult};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Fills gaps in per-cell time series with linear interpolation and flat
/// boundary extrapolation.
///
/// The interpolation x-axis is the date's ordinal position in the sorted
/// sequence, since sampling intervals may be uneven in calendar time (daily
/// vs. 8-day composites). The no-data sentinel and raw zero both count as
/// missing, per the legacy MODIS convention. Filling is idempotent.
pub struct TemporalInterpolator {
    nodata: f32,
}

impl TemporalInterpolator {
    pub fn new(nodata: f32) -> Self {
        TemporalInterpolator { nodata }
    }

    /// Fill one cell's series. Fails with an interpolation error when the
    /// cell has no valid value at all.
    pub fn fill(&self, series: &CellSeries) -> LstResult<CellSeries> {
        let values = self.fill_values(&series.values).ok_or_else(|| {
            LstError::Interpolation(format!(
                "cell {} has no valid value across the date series",
                series.cell_id
            ))
        })?;
        Ok(CellSeries {
            cell_id: series.cell_id,
            x: series.x,
            y: series.y,
            values,
        })
    }

    /// Fill every cell of a compiled table in parallel.
    ///
    /// Cells that cannot be filled are excluded from the returned table and
    /// reported with the reason, never silently dropped.
    pub fn fill_table(&self, table: &LstTable) -> (LstTable, Vec<(CellId, String)>) {
        let results: Vec<(CellId, LstResult<CellSeries>)> = table
            .cells
            .par_iter()
            .map(|(cell_id, series)| (*cell_id, self.fill(series)))
            .collect();

        let mut cells = BTreeMap::new();
        let mut excluded = Vec::new();
        for (cell_id, result) in results {
            match result {
                Ok(series) => {
                    cells.insert(cell_id, series);
                }
                Err(e) => excluded.push((cell_id, e.to_string())),
            }
        }

        if !excluded.is_empty() {
            log::warn!(
                "⚠️  Excluded {} of {} cells with no valid observations",
                excluded.len(),
                table.cells.len()
            );
        }

        (
            LstTable {
                dates: table.dates.clone(),
                cells,
            },
            excluded,
        )
    }

    fn fill_values(&self, values: &[Option<f32>]) -> Option<Vec<Option<f32>>> {
        // Re-mask first so the routine is idempotent over its own output
        let masked: Vec<Option<f32>> = values
            .iter()
            .map(|v| v.filter(|&x| x != self.nodata && x != 0.0))
            .collect();

        let valid: Vec<(usize, f32)> = masked
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|value| (i, value)))
            .collect();
        if valid.is_empty() {
            return None;
        }

        let mut out = masked;

        // Leading run: flat forward-fill from the first valid value
        let (first_index, first_value) = valid[0];
        for slot in out.iter_mut().take(first_index) {
            *slot = Some(first_value);
        }

        // Trailing run: flat backward-fill from the last valid value
        let (last_index, last_value) = valid[valid.len() - 1];
        for slot in out.iter_mut().skip(last_index + 1) {
            *slot = Some(last_value);
        }

        // Interior runs: linear interpolation against ordinal positions
        for pair in valid.windows(2) {
            let (t1, v1) = pair[0];
            let (t2, v2) = pair[1];
            for t in (t1 + 1)..t2 {
                let fraction = (t - t1) as f32 / (t2 - t1) as f32;
                out[t] = Some(v1 + (v2 - v1) * fraction);
            }
        }

        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcqDate;
    use approx::assert_relative_eq;

    fn series(values: Vec<Option<f32>>) -> CellSeries {
        CellSeries {
            cell_id: CellId { qx: 1, qy: 1 },
            x: 10.0,
            y: -10.0,
            values,
        }
    }

    fn interpolator() -> TemporalInterpolator {
        TemporalInterpolator::new(-999.0)
    }

    fn fill(values: Vec<Option<f32>>) -> Vec<f32> {
        interpolator()
            .fill(&series(values))
            .unwrap()
            .values
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn test_leading_run_forward_fills() {
        // Dates [1, 9, 17], raw values [0, 10, 20]: zero counts as missing
        assert_eq!(fill(vec![Some(0.0), Some(10.0), Some(20.0)]), vec![10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_interior_run_interpolates_linearly() {
        // Dates [1, 9, 17], raw values [5, 0, 15]
        assert_eq!(fill(vec![Some(5.0), Some(0.0), Some(15.0)]), vec![5.0, 10.0, 15.0]);
    }

    #[test]
    fn test_trailing_run_backward_fills() {
        assert_eq!(
            fill(vec![Some(5.0), Some(15.0), None, Some(-999.0)]),
            vec![5.0, 15.0, 15.0, 15.0]
        );
    }

    #[test]
    fn test_sentinel_treated_as_missing() {
        assert_eq!(
            fill(vec![Some(10.0), Some(-999.0), Some(20.0)]),
            vec![10.0, 15.0, 20.0]
        );
    }

    #[test]
    fn test_interior_law_over_longer_run() {
        // Valid at positions 0 and 3; positions 1 and 2 follow
        // v1 + (v2-v1)*(t-t1)/(t2-t1)
        let filled = fill(vec![Some(10.0), None, None, Some(40.0)]);
        assert_relative_eq!(filled[1], 20.0);
        assert_relative_eq!(filled[2], 30.0);
    }

    #[test]
    fn test_all_missing_cell_is_interpolation_error() {
        let result = interpolator().fill(&series(vec![None, Some(-999.0), Some(0.0)]));
        assert!(matches!(result, Err(LstError::Interpolation(_))));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let cases = vec![
            vec![Some(0.0), Some(10.0), Some(20.0)],
            vec![Some(5.0), None, Some(15.0), Some(-999.0)],
            vec![None, None, Some(7.0)],
            vec![Some(3.0), Some(-999.0), None, Some(9.0), None],
        ];
        let interp = interpolator();
        for values in cases {
            let once = interp.fill(&series(values)).unwrap();
            let twice = interp.fill(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_fill_table_excludes_unfillable_cells() {
        let dates = vec![
            AcqDate::new(2016, 1).unwrap(),
            AcqDate::new(2016, 9).unwrap(),
            AcqDate::new(2016, 17).unwrap(),
        ];
        let mut cells = BTreeMap::new();
        cells.insert(
            CellId { qx: 1, qy: 1 },
            series(vec![Some(280.0), None, Some(284.0)]),
        );
        cells.insert(CellId { qx: 2, qy: 1 }, series(vec![None, None, None]));
        let table = LstTable { dates, cells };

        let (filled, excluded) = interpolator().fill_table(&table);
        assert_eq!(filled.cells.len(), 1);
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].0, CellId { qx: 2, qy: 1 });
        assert_eq!(
            filled.cells[&CellId { qx: 1, qy: 1 }].values,
            vec![Some(280.0), Some(282.0), Some(284.0)]
        );
    }
}
