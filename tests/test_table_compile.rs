use lstprep::{
    AcqDate, CellId, CellSample, DateSamples, LstError, TableCompiler, TemporalInterpolator,
};
use lstprep::core::table::GridRef;

fn grid() -> GridRef {
    GridRef {
        origin: (500000.0, 5200000.0),
        resolution: (1000.0, -1000.0),
    }
}

fn sample(qx: i64, qy: i64, value: f32, date: AcqDate) -> CellSample {
    CellSample {
        cell_id: CellId { qx, qy },
        x: qx as f64 * 1000.0,
        y: qy as f64 * -1000.0,
        value,
        date,
    }
}

fn date(doy: u16) -> AcqDate {
    AcqDate::new(2016, doy).unwrap()
}

#[test]
fn test_compiled_column_count_matches_processed_dates() {
    let by_date: Vec<DateSamples> = [1u16, 9, 17, 25]
        .iter()
        .map(|&doy| DateSamples {
            date: date(doy),
            grid: grid(),
            samples: vec![sample(10, 20, 280.0 + doy as f32, date(doy))],
        })
        .collect();

    let table = TableCompiler::default().merge_series(&by_date).unwrap();
    assert_eq!(table.column_count(), by_date.len() + 3);
}

#[test]
fn test_cells_missing_on_some_dates_stay_aligned() {
    // Cloud masks differ between dates; the identity join must not shift
    // values between rows
    let by_date = vec![
        DateSamples {
            date: date(1),
            grid: grid(),
            samples: vec![
                sample(10, 20, 270.0, date(1)),
                sample(11, 20, 271.0, date(1)),
                sample(12, 20, 272.0, date(1)),
            ],
        },
        DateSamples {
            date: date(9),
            grid: grid(),
            samples: vec![sample(11, 20, 281.0, date(9))],
        },
        DateSamples {
            date: date(17),
            grid: grid(),
            samples: vec![
                sample(10, 20, 290.0, date(17)),
                sample(12, 20, 292.0, date(17)),
            ],
        },
    ];

    let table = TableCompiler::default().merge_series(&by_date).unwrap();
    assert_eq!(table.cells.len(), 3);
    assert_eq!(
        table.cells[&CellId { qx: 10, qy: 20 }].values,
        vec![Some(270.0), None, Some(290.0)]
    );
    assert_eq!(
        table.cells[&CellId { qx: 11, qy: 20 }].values,
        vec![Some(271.0), Some(281.0), None]
    );
    assert_eq!(
        table.cells[&CellId { qx: 12, qy: 20 }].values,
        vec![Some(272.0), None, Some(292.0)]
    );
}

#[test]
fn test_misaligned_date_fails_with_alignment_error() {
    let mut bad_grid = grid();
    bad_grid.resolution.0 = 999.0;

    let by_date = vec![
        DateSamples {
            date: date(1),
            grid: grid(),
            samples: vec![sample(10, 20, 270.0, date(1))],
        },
        DateSamples {
            date: date(9),
            grid: bad_grid,
            samples: vec![sample(10, 20, 280.0, date(9))],
        },
    ];

    match TableCompiler::default().merge_series(&by_date) {
        Err(LstError::Alignment(msg)) => assert!(msg.contains("2016009")),
        other => panic!("expected alignment error, got {:?}", other),
    }
}

#[test]
fn test_all_missing_cell_excluded_from_final_table() {
    // Cell (11,20) is valid nowhere across [1, 9, 17]
    let by_date = vec![
        DateSamples {
            date: date(1),
            grid: grid(),
            samples: vec![sample(10, 20, 270.0, date(1)), sample(11, 20, 0.0, date(1))],
        },
        DateSamples {
            date: date(9),
            grid: grid(),
            samples: vec![sample(10, 20, 280.0, date(9)), sample(11, 20, -999.0, date(9))],
        },
        DateSamples {
            date: date(17),
            grid: grid(),
            samples: vec![sample(10, 20, 290.0, date(17))],
        },
    ];

    let table = TableCompiler::default().merge_series(&by_date).unwrap();
    let (filled, excluded) = TemporalInterpolator::new(-999.0).fill_table(&table);

    assert_eq!(filled.cells.len(), 1);
    assert!(filled.cells.contains_key(&CellId { qx: 10, qy: 20 }));
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].0, CellId { qx: 11, qy: 20 });

    // The surviving cell's gaps are filled
    assert_eq!(
        filled.cells[&CellId { qx: 10, qy: 20 }].values,
        vec![Some(270.0), Some(280.0), Some(290.0)]
    );
}
