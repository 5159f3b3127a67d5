//! Reads transaction records exported from the transaction store.
//!
//! Two formats are accepted:
//! - JSON: an array of record objects, or an object with the array under `"data"`
//!   (the shape returned by the hosted store's query API).
//! - CSV: a header row of field keys followed by one record per line.

use std::path::Path;

use serde_json::Value;

use crate::{Error, record::TransactionRecord};

/// The file formats records can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// A JSON array of objects.
    Json,
    /// Comma separated values with a header row.
    Csv,
}

impl RecordFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        if extension.eq_ignore_ascii_case("json") {
            Some(RecordFormat::Json)
        } else if extension.eq_ignore_ascii_case("csv") {
            Some(RecordFormat::Csv)
        } else {
            None
        }
    }
}

/// Parse `text` as a list of transaction records.
///
/// Only the outer structure is checked here, the records themselves are
/// validated by [crate::normalize]. A JSON entry that is not an object is
/// still returned so that it is skipped like any other invalid record.
///
/// # Errors
/// Returns [Error::InvalidJson] or [Error::InvalidCSV] if `text` is not in the given format.
pub fn parse_records(text: &str, format: RecordFormat) -> Result<Vec<TransactionRecord>, Error> {
    let records = match format {
        RecordFormat::Json => parse_json_records(text)?,
        RecordFormat::Csv => parse_csv_records(text)?,
    };

    tracing::debug!("read {} records as {format:?}", records.len());

    Ok(records)
}

fn parse_json_records(text: &str) -> Result<Vec<TransactionRecord>, Error> {
    let value: Value =
        serde_json::from_str(text).map_err(|error| Error::InvalidJson(error.to_string()))?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(Error::InvalidJson(
                    "expected an array of records under \"data\"".to_owned(),
                ));
            }
        },
        _ => {
            return Err(Error::InvalidJson(
                "expected an array of records".to_owned(),
            ));
        }
    };

    // Entries that are not objects are kept so they are skipped with a reason.
    Ok(records.into_iter().map(TransactionRecord::from).collect())
}

fn parse_csv_records(text: &str) -> Result<Vec<TransactionRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?
        .clone();

    reader
        .records()
        .map(|row| -> Result<TransactionRecord, Error> {
            let row = row.map_err(|error| Error::InvalidCSV(error.to_string()))?;

            // Empty cells are left out so they read as missing fields.
            Ok(headers
                .iter()
                .zip(row.iter())
                .filter(|(_, cell)| !cell.is_empty())
                .collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use crate::{
        Error,
        normalize::{ValidationError, normalize},
        record::{Field, TransactionRecord},
    };

    use super::{RecordFormat, parse_records};

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            RecordFormat::from_path(Path::new("history.JSON")),
            Some(RecordFormat::Json)
        );
        assert_eq!(
            RecordFormat::from_path(Path::new("exports/history.csv")),
            Some(RecordFormat::Csv)
        );
        assert_eq!(RecordFormat::from_path(Path::new("history.xlsx")), None);
        assert_eq!(RecordFormat::from_path(Path::new("history")), None);
    }

    #[test]
    fn reads_json_array() {
        let text = json!([
            {"transactionDate": "2024-01-15", "transactionSubtotal": 10.0},
            {"transactionDate": "2024-01-16"}
        ])
        .to_string();

        let records = parse_records(&text, RecordFormat::Json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Field::Subtotal), Some(&json!(10.0)));
    }

    #[test]
    fn reads_json_data_envelope() {
        let text = json!({"data": [{"date": "2024-01-15"}], "count": null}).to_string();

        let records = parse_records(&text, RecordFormat::Json).unwrap();

        assert_eq!(records, [TransactionRecord::new().with("date", "2024-01-15")]);
    }

    #[test]
    fn rejects_json_that_is_not_a_list() {
        assert!(matches!(
            parse_records("{\"records\": []}", RecordFormat::Json),
            Err(Error::InvalidJson(_))
        ));
        assert!(matches!(
            parse_records("\"2024-01-15\"", RecordFormat::Json),
            Err(Error::InvalidJson(_))
        ));
        assert!(matches!(
            parse_records("not json", RecordFormat::Json),
            Err(Error::InvalidJson(_))
        ));
    }

    #[test]
    fn keeps_json_entries_that_are_not_objects_for_skipping() {
        let text = json!([
            {"date": "2024-01-15", "subtotal": "10.00", "items": 1, "taxes": "0.80",
             "category": "Food", "payment": "Cash"},
            42,
            "2024-01-16"
        ])
        .to_string();

        let records = parse_records(&text, RecordFormat::Json).unwrap();
        assert_eq!(records.len(), 3);

        let table = normalize(&records).unwrap();
        assert_eq!(table.len(), 1);
        let skipped: Vec<_> = table.skipped().iter().map(|skipped| skipped.index).collect();
        assert_eq!(skipped, [1, 2]);
        assert_eq!(
            table.skipped()[0].error,
            ValidationError::NotAnObject("42".to_owned())
        );
    }

    #[test]
    fn reads_csv_with_header_row() {
        let text = "\
date,subtotal,items,taxes,category,payment
2024-01-15, 10.00 ,2,0.80,Food,Cash
2024-01-20,5.00,1,0.40,,Credit
";

        let records = parse_records(text, RecordFormat::Csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Field::Subtotal), Some(&json!("10.00")));
        assert_eq!(records[1].get(Field::Category), None);

        let table = normalize(&records).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_count(), 1);
    }

    #[test]
    fn rejects_ragged_csv() {
        let text = "date,subtotal\n2024-01-15,10.00,extra\n";

        assert!(matches!(
            parse_records(text, RecordFormat::Csv),
            Err(Error::InvalidCSV(_))
        ));
    }
}
