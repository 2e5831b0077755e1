//! CSV readers and writers for the tabular inputs and outputs.

use csv::{ReaderBuilder, StringRecord, Writer};
use grim_core::{GrimError, GrimResult, LineRecord, ParameterTable, TimeSeriesTable};
use std::path::Path;
use tracing::debug;

fn open(path: &Path) -> GrimResult<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| GrimError::Parse(format!("opening {}: {}", path.display(), e)))
}

fn parse_cell(value: &str, path: &Path, row: usize, column: &str) -> GrimResult<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<f64>().map(Some).map_err(|_| {
        GrimError::Parse(format!(
            "{}: row {}, column '{}': '{}' is not a number",
            path.display(),
            row + 1,
            column,
            value
        ))
    })
}

/// Read a row-keyed numeric table: the first column holds the row key, every
/// other column is numeric. Empty cells become absent values.
pub fn read_parameter_table(path: &Path) -> GrimResult<ParameterTable> {
    let mut rdr = open(path)?;
    let headers = rdr
        .headers()
        .map_err(|e| GrimError::Parse(format!("{}: {}", path.display(), e)))?
        .clone();
    if headers.is_empty() {
        return Err(GrimError::Parse(format!("{}: missing header row", path.display())));
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut table = ParameterTable::new(columns.clone());

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| GrimError::Parse(format!("{}: {}", path.display(), e)))?;
        let key = record.get(0).unwrap_or_default().to_string();
        let mut values = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            values.push(parse_cell(record.get(i + 1).unwrap_or_default(), path, row, column)?);
        }
        table
            .push_row(key, values)
            .map_err(|e| GrimError::Validation(format!("{}: {}", path.display(), e)))?;
    }

    debug!(path = %path.display(), rows = table.num_rows(), columns = columns.len(), "parameter table read");
    Ok(table)
}

/// Read an hourly table with one column per series.
///
/// Columns that are not fully numeric (timestamps, labels, an unnamed
/// index) are skipped; consumers only look up node columns.
pub fn read_time_series(path: &Path) -> GrimResult<TimeSeriesTable> {
    let mut rdr = open(path)?;
    let headers = rdr
        .headers()
        .map_err(|e| GrimError::Parse(format!("{}: {}", path.display(), e)))?
        .clone();
    let records: Vec<StringRecord> = rdr
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| GrimError::Parse(format!("{}: {}", path.display(), e)))?;

    let mut table = TimeSeriesTable::new();
    let mut skipped = Vec::new();
    for (i, name) in headers.iter().enumerate() {
        let parsed: Option<Vec<f64>> = records
            .iter()
            .map(|r| r.get(i).and_then(|v| v.parse::<f64>().ok()))
            .collect();
        match parsed {
            Some(values) if !name.is_empty() => table.insert_column(name, values)?,
            _ => skipped.push(name.to_string()),
        }
    }

    debug!(
        path = %path.display(),
        rows = records.len(),
        skipped = ?skipped,
        "time series read"
    );
    Ok(table)
}

/// Read the transmission topology; line id = 0-based row index.
pub fn read_lines(path: &Path) -> GrimResult<Vec<LineRecord>> {
    let mut rdr = open(path)?;
    let mut lines = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let record: LineRecord = result.map_err(|e| {
            GrimError::Parse(format!("{}: line {}: {}", path.display(), row, e))
        })?;
        lines.push(record);
    }
    debug!(path = %path.display(), lines = lines.len(), "topology read");
    Ok(lines)
}

/// Write a labelled matrix: header is `corner, columns...`, then one row per label.
pub fn write_matrix(
    path: &Path,
    corner: &str,
    columns: &[String],
    rows: &[(String, Vec<f64>)],
) -> GrimResult<()> {
    let mut wtr = Writer::from_path(path)
        .map_err(|e| GrimError::Parse(format!("creating {}: {}", path.display(), e)))?;
    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(corner.to_string());
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;
    for (label, values) in rows {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(label.clone());
        record.extend(values.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parameter_table_keeps_empty_cells_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.csv");
        fs::write(&path, "tech,CapEx(€/kW),eta_in\ngas,800,\nbattery,300,0.9\n").unwrap();

        let table = read_parameter_table(&path).unwrap();
        assert_eq!(table.get("gas", "CapEx(€/kW)"), Some(800.0));
        assert_eq!(table.get("gas", "eta_in"), None);
        assert_eq!(table.get("battery", "eta_in"), Some(0.9));
    }

    #[test]
    fn parameter_table_rejects_text_in_numeric_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.csv");
        fs::write(&path, "tech,CapEx(€/kW)\ngas,cheap\n").unwrap();
        let err = read_parameter_table(&path).unwrap_err();
        assert!(err.to_string().contains("cheap"));
    }

    #[test]
    fn time_series_skips_non_numeric_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demand.csv");
        fs::write(&path, "time,0,1\n2020-01-01 00:00,1.5,2.5\n2020-01-01 01:00,3.5,4.5\n").unwrap();

        let table = read_time_series(&path).unwrap();
        assert_eq!(table.column("0"), Some(&[1.5, 3.5][..]));
        assert!(table.column("time").is_none());
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn lines_deserialize_by_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.csv");
        fs::write(&path, "region1,region2,x,capacity,length,name\n0,1,0.1,100,50,north\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec![LineRecord::new(0, 1, 0.1, 100.0, 50.0)]);
    }
}
