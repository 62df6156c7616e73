use crate::aggregate::NationalityRow;
use crate::series::SeriesPoint;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn csv_safe(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Write through a temp file in the target directory, then rename over `path`.
fn write_atomically<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    write(&mut tmp)?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Save a breakdown table (`nationality,tourists`) as CSV with header.
pub fn save_table_csv<P: AsRef<Path>>(rows: &[NationalityRow], path: P) -> Result<()> {
    write_atomically(path, |f| {
        let mut wtr = WriterBuilder::new().from_writer(f);
        wtr.serialize(("nationality", "tourists"))?;
        for r in rows {
            wtr.serialize((csv_safe(&r.nationality), r.tourists))?;
        }
        wtr.flush()?;
        Ok(())
    })
}

/// Save a monthly series (`month,date,value`) as CSV with header.
pub fn save_series_csv<P: AsRef<Path>>(points: &[SeriesPoint], path: P) -> Result<()> {
    write_atomically(path, |f| {
        let mut wtr = WriterBuilder::new().from_writer(f);
        wtr.serialize(("month", "date", "value"))?;
        for p in points {
            wtr.serialize((p.month.to_string(), p.date.to_string(), p.value))?;
        }
        wtr.flush()?;
        Ok(())
    })
}

/// Save any serializable value (display data, derived datasets) as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    write_atomically(path, |f| {
        let s = serde_json::to_string_pretty(value)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    })
}
