use std::fs;
use tempfile::tempdir;
use turizem::aggregate::NationalityRow;
use turizem::series::SeriesPoint;
use turizem::storage;

fn row(n: &str, v: f64) -> NationalityRow {
    NationalityRow {
        nationality: n.into(),
        tourists: v,
    }
}

#[test]
fn save_table_and_series() {
    let dir = tempdir().unwrap();

    let rows = vec![row("Italy", 50.0), row("Unselected", 50.0)];
    let csv_path = dir.path().join("table.csv");
    storage::save_table_csv(&rows, &csv_path).unwrap();
    let txt = fs::read_to_string(&csv_path).unwrap();
    assert!(txt.starts_with("nationality,tourists"));
    assert_eq!(txt.lines().count(), 1 + rows.len());

    let jan: turizem::MonthKey = "2024M01".parse().unwrap();
    let points = vec![SeriesPoint {
        month: jan,
        date: jan.first_day(),
        value: 120.0,
    }];
    let series_path = dir.path().join("series.csv");
    storage::save_series_csv(&points, &series_path).unwrap();
    let txt = fs::read_to_string(&series_path).unwrap();
    let mut lines = txt.lines();
    assert_eq!(lines.next(), Some("month,date,value"));
    assert!(lines.next().unwrap().starts_with("2024M01,2024-01-01,120"));

    let json_path = dir.path().join("rows.json");
    storage::save_json(&rows, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[0]["nationality"], "Italy");
}

// Spreadsheet apps evaluate cells starting with = + - @; exported names get a
// leading quote so they stay text.
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![
        row("=HYPERLINK(\"http://evil\")", 1.0),
        row("+SUM(A1:A9)", 2.0),
        row("-2+3", 3.0),
        row("@foo", 4.0),
        row("Italy", 5.0),
    ];
    let dir = tempdir().unwrap();
    let path = dir.path().join("inject.csv");
    storage::save_table_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let names: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "'=HYPERLINK(\"http://evil\")",
            "'+SUM(A1:A9)",
            "'-2+3",
            "'@foo",
            "Italy"
        ]
    );
}

#[test]
fn overwrite_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    storage::save_table_csv(&[row("A", 1.0), row("B", 2.0)], &path).unwrap();
    storage::save_table_csv(&[row("C", 3.0)], &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    assert_eq!(txt.lines().count(), 2);
    assert!(txt.contains("C,3"));
    // no temp files left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
