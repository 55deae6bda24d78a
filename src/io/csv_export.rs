use crate::core::table::LstTable;
use crate::types::{CellSample, LstResult};
use std::path::Path;

/// Write one date's point extract: `[row_id, X, Y, value]`, one row per
/// valid cell.
pub fn write_date_extract<P: AsRef<Path>>(path: P, samples: &[CellSample]) -> LstResult<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["row_id", "X", "Y", "value"])?;
    for (row_id, sample) in samples.iter().enumerate() {
        writer.write_record([
            (row_id + 1).to_string(),
            format!("{}", sample.x),
            format!("{}", sample.y),
            format!("{}", sample.value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the compiled table: `[cell_id, X, Y, value_<date>...]`, date
/// columns ascending, one row per observed cell identity.
pub fn write_compiled_table<P: AsRef<Path>>(path: P, table: &LstTable) -> LstResult<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["cell_id".to_string(), "X".to_string(), "Y".to_string()];
    header.extend(table.dates.iter().map(|d| format!("value_{}", d)));
    writer.write_record(&header)?;

    for series in table.cells.values() {
        let mut record = vec![
            series.cell_id.to_string(),
            format!("{}", series.x),
            format!("{}", series.y),
        ];
        record.extend(series.values.iter().map(|v| match v {
            Some(value) => format!("{}", value),
            None => String::new(),
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
