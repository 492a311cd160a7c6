//! Upload parsers: CSV files and JSON record arrays into a [`Batch`]

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Batch, Record};

/// Parse a cell as a JSON number: integers first, then finite floats
fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i.into());
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

/// A column is numeric when every non-empty cell parses as a number
///
/// One text cell keeps the whole column as text, so `7600` or `0012` in a
/// description column survive as the strings that were uploaded.
fn numeric_columns(width: usize, rows: &[StringRecord]) -> Vec<bool> {
    (0..width)
        .map(|i| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .filter(|cell| !cell.trim().is_empty())
                .all(|cell| parse_number(cell).is_some())
        })
        .collect()
}

/// Type one cell according to its column: empty is null, otherwise number or text
fn cell_to_json(raw: &str, numeric: bool) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    if numeric {
        if let Some(n) = parse_number(raw) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// Convert a CSV record to a JSON object using headers as keys
///
/// Short rows are padded with nulls.
fn record_to_json(headers: &StringRecord, numeric: &[bool], record: &StringRecord) -> Record {
    let mut map = Record::new();
    for (i, header) in headers.iter().enumerate() {
        let value = record
            .get(i)
            .map(|cell| cell_to_json(cell, numeric[i]))
            .unwrap_or(Value::Null);
        map.insert(header.to_string(), value);
    }
    map
}

/// Parse an uploaded CSV file
///
/// The first line is the header. Rows with more fields than the header are
/// rejected; rows with fewer are padded with nulls.
pub fn parse_csv<R: Read>(reader: R) -> Result<Batch> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::UnstructuredInput(e.to_string()))?
        .clone();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(Error::UnstructuredInput(
            "No columns to parse from file".into(),
        ));
    }

    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut raw_rows = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| Error::UnstructuredInput(e.to_string()))?;
        if record.len() > headers.len() {
            return Err(Error::UnstructuredInput(format!(
                "Row {} has {} fields, header has {}",
                row,
                record.len(),
                headers.len()
            )));
        }
        raw_rows.push(record);
    }

    let numeric = numeric_columns(headers.len(), &raw_rows);
    let records: Vec<Record> = raw_rows
        .iter()
        .map(|record| record_to_json(&headers, &numeric, record))
        .collect();

    debug!(
        columns = columns.len(),
        rows = records.len(),
        "Parsed CSV upload"
    );
    Ok(Batch::new(columns, records))
}

/// Parse a JSON array of flat objects
pub fn parse_json_records(data: &[u8]) -> Result<Batch> {
    let value: Value =
        serde_json::from_slice(data).map_err(|e| Error::UnstructuredInput(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(Error::UnstructuredInput(
            "Expected a JSON array of records".into(),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (row, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                return Err(Error::UnstructuredInput(format!(
                    "Element {} is not an object: {}",
                    row, other
                )))
            }
        }
    }

    let batch = batch_from_records(records);
    debug!(
        columns = batch.columns.len(),
        rows = batch.records.len(),
        "Parsed JSON upload"
    );
    Ok(batch)
}

/// Build a batch whose columns are the union of record keys, first-seen order
pub fn batch_from_records(records: Vec<Record>) -> Batch {
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    Batch::new(columns, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_typing() {
        assert_eq!(cell_to_json("", true), Value::Null);
        assert_eq!(cell_to_json("  ", false), Value::Null);
        assert_eq!(cell_to_json("42", true), json!(42));
        assert_eq!(cell_to_json("-1.5", true), json!(-1.5));
        assert_eq!(cell_to_json("42", false), json!("42"));
        assert_eq!(cell_to_json("STARBUCKS #4521", false), json!("STARBUCKS #4521"));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let csv = "Amount,Description\n4.5,STARBUCKS\n12,7600\n3,0012\n1,NaN\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(batch.records[0]["Amount"], json!(4.5));
        assert_eq!(batch.records[1]["Amount"], json!(12));
        assert_eq!(batch.records[1]["Description"], json!("7600"));
        assert_eq!(batch.records[2]["Description"], json!("0012"));
        assert_eq!(batch.records[3]["Description"], json!("NaN"));
    }

    #[test]
    fn test_non_finite_text_keeps_column_as_text() {
        let csv = "Amount\n1\ninf\n\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(batch.records[0]["Amount"], json!("1"));
        assert_eq!(batch.records[1]["Amount"], json!("inf"));
    }

    #[test]
    fn test_parse_csv_keeps_column_order() {
        let csv = "Time,Description,Amount\n0,STARBUCKS #4521,4.5\n86400,,12\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(batch.columns, vec!["Time", "Description", "Amount"]);
        assert_eq!(batch.len(), 2);
        let keys: Vec<&String> = batch.records[0].keys().collect();
        assert_eq!(keys, vec!["Time", "Description", "Amount"]);
        assert_eq!(batch.records[0]["Amount"], json!(4.5));
        assert_eq!(batch.records[1]["Description"], Value::Null);
    }

    #[test]
    fn test_parse_csv_pads_short_rows() {
        let csv = "Amount,Description\n10\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(batch.records[0]["Description"], Value::Null);
    }

    #[test]
    fn test_parse_csv_rejects_long_rows() {
        let csv = "Amount\n10,11\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnstructuredInput(_)));
    }

    #[test]
    fn test_parse_csv_empty_file() {
        let err = parse_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnstructuredInput(_)));
    }

    #[test]
    fn test_parse_csv_header_only() {
        let batch = parse_csv("Amount,Time\n".as_bytes()).unwrap();
        assert!(batch.is_empty());
        assert!(batch.has_column("Time"));
    }

    #[test]
    fn test_parse_json_records_union_of_keys() {
        let data = br#"[{"Amount": 1, "Time": 0}, {"Amount": 2, "category": "N/A"}]"#;
        let batch = parse_json_records(data).unwrap();
        assert_eq!(batch.columns, vec!["Amount", "Time", "category"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_parse_json_records_rejects_non_array() {
        let err = parse_json_records(br#"{"Amount": 1}"#).unwrap_err();
        assert!(matches!(err, Error::UnstructuredInput(_)));

        let err = parse_json_records(b"not json").unwrap_err();
        assert!(matches!(err, Error::UnstructuredInput(_)));

        let err = parse_json_records(b"[1, 2]").unwrap_err();
        assert!(matches!(err, Error::UnstructuredInput(_)));
    }
}
