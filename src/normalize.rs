//! Converts raw transaction records into the typed rows used for aggregation.
//!
//! Records that fail validation are skipped and kept in the resulting table
//! alongside the reason they were rejected, so one bad record never takes
//! the rest of the batch down with it.

use serde_json::Value;
use time::{
    Date, Month, Weekday, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    calendar::{MONTH_ORDER, WEEKDAY_ORDER},
    category::{Category, PaymentMethod},
    record::{Field, TransactionRecord},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The largest subtotal or tax amount accepted for a single purchase.
pub const MAX_AMOUNT: f64 = 1e12;

/// The reasons a single transaction record can be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The record was some other JSON value, such as a number or a list.
    #[error("record is not a JSON object: {0}")]
    NotAnObject(String),

    /// A required field was absent, null or blank.
    #[error("missing required field \"{0}\"")]
    MissingField(Field),

    /// A money field could not be read as a finite number.
    #[error("field \"{field}\" is not a number: {value}")]
    InvalidNumber {
        /// The field that failed to parse.
        field: Field,
        /// The offending value as JSON text.
        value: String,
    },

    /// A count field could not be read as a whole number.
    #[error("field \"{field}\" is not a whole number: {value}")]
    InvalidInteger {
        /// The field that failed to parse.
        field: Field,
        /// The offending value as JSON text.
        value: String,
    },

    /// A money field was larger than [MAX_AMOUNT].
    #[error("field \"{field}\" is too large to be a purchase amount: {value}")]
    AmountTooLarge {
        /// The field with the oversized value.
        field: Field,
        /// The offending value as JSON text.
        value: String,
    },

    /// A money or count field was below zero.
    #[error("field \"{field}\" must not be negative: {value}")]
    NegativeValue {
        /// The field with the negative value.
        field: Field,
        /// The offending value as JSON text.
        value: String,
    },

    /// The date was not in `YYYY-MM-DD` form (optionally followed by a time).
    #[error("could not parse {0} as a date")]
    InvalidDate(String),

    /// The payment method was neither cash nor credit.
    #[error("{0} is not a valid payment method, expected \"Cash\" or \"Credit\"")]
    InvalidPaymentMethod(String),
}

/// A record that was left out of the table and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// The position of the record in the input.
    pub index: usize,
    /// Why the record was rejected.
    pub error: ValidationError,
}

/// One validated transaction with its derived date parts.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// The date of the purchase.
    pub date: Date,
    /// The number of items purchased.
    pub items: u32,
    /// The amount before taxes, rounded to cents.
    pub subtotal: f64,
    /// The taxes paid, rounded to cents.
    pub taxes: f64,
    /// `subtotal + taxes`, rounded to cents.
    pub total: f64,
    /// The spending category.
    pub category: Category,
    /// Cash or credit.
    pub payment_method: PaymentMethod,
    /// The calendar month of `date`.
    pub month: Month,
    /// The day of the week of `date`.
    pub weekday: Weekday,
    /// The year of `date`.
    pub year: i32,
}

/// The normalized form of a batch of transaction records.
///
/// Rows keep the order of the valid input records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
    rows: Vec<CanonicalRow>,
    skipped: Vec<SkippedRecord>,
    total_mismatches: usize,
}

impl CanonicalTable {
    /// A table with no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The valid rows in input order.
    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    /// The number of valid rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The records that were rejected during normalization.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// The number of records that were rejected during normalization.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// The number of rows whose stored total did not match `subtotal + taxes`.
    pub fn total_mismatches(&self) -> usize {
        self.total_mismatches
    }

    /// The display order of the month column.
    pub fn month_order(&self) -> &'static [Month; 12] {
        &MONTH_ORDER
    }

    /// The display order of the weekday column.
    pub fn weekday_order(&self) -> &'static [Weekday; 7] {
        &WEEKDAY_ORDER
    }
}

/// Validate and normalize `records`.
///
/// Invalid records are skipped and listed in [CanonicalTable::skipped].
/// An empty input produces an empty table.
///
/// # Errors
/// Returns [Error::AllRecordsInvalid] if `records` is not empty and every record was rejected.
pub fn normalize(records: &[TransactionRecord]) -> Result<CanonicalTable, Error> {
    let mut table = CanonicalTable::empty();

    for (index, record) in records.iter().enumerate() {
        match normalize_record(record) {
            Ok((row, total_matches)) => {
                if !total_matches {
                    tracing::warn!(
                        "record {index} has a stored total that does not match subtotal + taxes, using {}",
                        row.total
                    );
                    table.total_mismatches += 1;
                }
                table.rows.push(row);
            }
            Err(error) => {
                tracing::debug!("skipping record {index}: {error}");
                table.skipped.push(SkippedRecord { index, error });
            }
        }
    }

    if !records.is_empty() && table.rows.is_empty() {
        tracing::error!("all {} transaction records were invalid", records.len());
        return Err(Error::AllRecordsInvalid {
            skipped: table.skipped.len(),
        });
    }

    tracing::info!(
        "normalized {} of {} transaction records ({} skipped)",
        table.rows.len(),
        records.len(),
        table.skipped.len()
    );

    Ok(table)
}

/// Round `amount` to two decimal places.
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Returns the row and whether any stored total agreed with the derived total.
fn normalize_record(record: &TransactionRecord) -> Result<(CanonicalRow, bool), ValidationError> {
    if !record.is_object() {
        return Err(ValidationError::NotAnObject(record.as_value().to_string()));
    }

    let date = parse_date(record)?;
    let subtotal = parse_amount(record, Field::Subtotal)?;
    let items = parse_items(record)?;
    let taxes = parse_amount(record, Field::Taxes)?;

    let category = required(record, Field::Category)
        .and_then(text)
        .and_then(|name| Category::from_name(&name))
        .ok_or(ValidationError::MissingField(Field::Category))?;

    let payment_text = required(record, Field::PaymentMethod)
        .ok_or(ValidationError::MissingField(Field::PaymentMethod))?;
    let payment_method = text(payment_text)
        .and_then(|name| PaymentMethod::from_name(&name))
        .ok_or_else(|| ValidationError::InvalidPaymentMethod(payment_text.to_string()))?;

    let total = round_cents(subtotal + taxes);
    let total_matches = match required(record, Field::Total) {
        Some(stored) => number(stored).is_some_and(|stored| to_cents(stored) == to_cents(total)),
        None => true,
    };

    let row = CanonicalRow {
        date,
        items,
        subtotal,
        taxes,
        total,
        category,
        payment_method,
        month: date.month(),
        weekday: date.weekday(),
        year: date.year(),
    };

    Ok((row, total_matches))
}

/// Get the value for `field`, treating blank strings as missing.
fn required(record: &TransactionRecord, field: Field) -> Option<&Value> {
    record.get(field).filter(|value| match value {
        Value::String(string) => !string.trim().is_empty(),
        _ => true,
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(string) => string.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn parse_amount(record: &TransactionRecord, field: Field) -> Result<f64, ValidationError> {
    let value = required(record, field).ok_or(ValidationError::MissingField(field))?;
    let amount = number(value).ok_or_else(|| ValidationError::InvalidNumber {
        field,
        value: value.to_string(),
    })?;

    if amount < 0.0 {
        return Err(ValidationError::NegativeValue {
            field,
            value: value.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            field,
            value: value.to_string(),
        });
    }

    Ok(round_cents(amount))
}

fn parse_items(record: &TransactionRecord) -> Result<u32, ValidationError> {
    let field = Field::Items;
    let value = required(record, field).ok_or(ValidationError::MissingField(field))?;
    let invalid = || ValidationError::InvalidInteger {
        field,
        value: value.to_string(),
    };

    let count = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral)),
        Value::String(string) => {
            let string = string.trim();
            string
                .parse::<i64>()
                .ok()
                .or_else(|| string.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
    .ok_or_else(invalid)?;

    if count < 0 {
        return Err(ValidationError::NegativeValue {
            field,
            value: value.to_string(),
        });
    }

    u32::try_from(count).map_err(|_| invalid())
}

/// Converts whole-valued floats such as `2.0` to integers.
fn integral(number: f64) -> Option<i64> {
    (number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64)
        .then_some(number as i64)
}

fn parse_date(record: &TransactionRecord) -> Result<Date, ValidationError> {
    let value = required(record, Field::Date).ok_or(ValidationError::MissingField(Field::Date))?;
    let invalid = || ValidationError::InvalidDate(value.to_string());

    let Value::String(string) = value else {
        return Err(invalid());
    };

    // Date-times such as "2024-01-15T09:30:00Z" only contribute their date.
    let string = string.trim();
    let date_part = match string.char_indices().nth(10) {
        Some((position, 'T' | 't' | ' ')) => &string[..position],
        _ => string,
    };

    Date::parse(date_part, DATE_FORMAT).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::{Month, Weekday, macros::date};

    use crate::{
        Error,
        calendar::{MONTH_ORDER, WEEKDAY_ORDER},
        category::{Category, PaymentMethod},
        record::{Field, TransactionRecord},
    };

    use super::{MAX_AMOUNT, ValidationError, normalize};

    fn record(
        date: &str,
        subtotal: &str,
        items: &str,
        taxes: &str,
        category: &str,
        payment: &str,
    ) -> TransactionRecord {
        TransactionRecord::new()
            .with("date", date)
            .with("subtotal", subtotal)
            .with("items", items)
            .with("taxes", taxes)
            .with("category", category)
            .with("payment", payment)
    }

    fn valid_record() -> TransactionRecord {
        record("2024-01-15", "10.00", "2", "0.80", "Food", "Cash")
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = normalize(&[]).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.skipped_count(), 0);
    }

    #[test]
    fn normalizes_fields_and_derives_date_parts() {
        let table = normalize(&[valid_record()]).unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.date, date!(2024 - 01 - 15));
        assert_eq!(row.items, 2);
        assert_eq!(row.subtotal, 10.0);
        assert_eq!(row.taxes, 0.8);
        assert_eq!(row.total, 10.8);
        assert_eq!(row.category, Category::Food);
        assert_eq!(row.payment_method, PaymentMethod::Cash);
        assert_eq!(row.month, Month::January);
        assert_eq!(row.weekday, Weekday::Monday);
        assert_eq!(row.year, 2024);
    }

    #[test]
    fn reads_canonical_keys_and_json_numbers() {
        let record: TransactionRecord = serde_json::from_value(json!({
            "transactionId": 42,
            "userId": 1,
            "transactionDate": "2023-12-31",
            "transactionSubtotal": 25.5,
            "transactionItems": 3,
            "transactionTaxes": 2.04,
            "transactionCategory": "Gift",
            "transactionPayment": "Credit"
        }))
        .unwrap();

        let table = normalize(&[record]).unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.items, 3);
        assert_eq!(row.total, 27.54);
        assert_eq!(row.category, Category::Gift);
        assert_eq!(row.weekday, Weekday::Sunday);
    }

    #[test]
    fn rounds_amounts_to_cents() {
        let table =
            normalize(&[record("2024-01-15", "19.999", "1", "0.001", "Food", "Cash")]).unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.subtotal, 20.0);
        assert_eq!(row.taxes, 0.0);
        assert_eq!(row.total, 20.0);
    }

    #[test]
    fn skips_amounts_too_large_to_sum() {
        let records = [
            valid_record(),
            valid_record().with("subtotal", "1e307"),
            valid_record().with("taxes", 1.5e308),
            valid_record().with("subtotal", MAX_AMOUNT),
        ];

        let table = normalize(&records).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.skipped()[0].error,
            ValidationError::AmountTooLarge {
                field: Field::Subtotal,
                value: "\"1e307\"".to_owned()
            }
        );
        assert!(matches!(
            table.skipped()[1].error,
            ValidationError::AmountTooLarge {
                field: Field::Taxes,
                ..
            }
        ));
        assert!(table.rows().iter().all(|row| row.total.is_finite()));
        assert!(table.rows()[1].total > MAX_AMOUNT);
    }

    #[test]
    fn skips_records_that_are_not_objects() {
        let records = [
            valid_record(),
            TransactionRecord::from(json!(42)),
            TransactionRecord::from(json!(["2024-01-15", "10.00"])),
        ];

        let table = normalize(&records).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped()[0].index, 1);
        assert_eq!(
            table.skipped()[0].error,
            ValidationError::NotAnObject("42".to_owned())
        );
        assert_eq!(table.skipped()[1].index, 2);
    }

    #[test]
    fn accepts_date_times() {
        let records = [
            valid_record().with("date", "2024-03-02T18:45:00+00:00"),
            valid_record().with("date", "2024-03-03 07:00:00"),
        ];

        let table = normalize(&records).unwrap();

        assert_eq!(table.rows()[0].date, date!(2024 - 03 - 02));
        assert_eq!(table.rows()[1].date, date!(2024 - 03 - 03));
    }

    #[test]
    fn accepts_integral_floats_for_items() {
        let table = normalize(&[valid_record().with("items", 4.0)]).unwrap();

        assert_eq!(table.rows()[0].items, 4);
    }

    #[test]
    fn skips_record_missing_category() {
        let missing_category: TransactionRecord = [
            ("date", "2024-01-15"),
            ("subtotal", "99"),
            ("items", "2"),
            ("taxes", "0.80"),
            ("payment", "Cash"),
        ]
        .into_iter()
        .collect();
        let blank_category = valid_record().with("category", "  ").with("subtotal", "99");
        let records = [valid_record(), missing_category, valid_record(), blank_category];

        let table = normalize(&records).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_count(), 2);
        assert_eq!(table.skipped()[0].index, 1);
        assert_eq!(table.skipped()[1].index, 3);
        for skipped in table.skipped() {
            assert_eq!(skipped.error, ValidationError::MissingField(Field::Category));
        }
        assert!(table.rows().iter().all(|row| row.subtotal == 10.0));
    }

    #[test]
    fn row_count_plus_skip_count_equals_input_length() {
        let records = [
            valid_record(),
            valid_record().with("subtotal", "ten dollars"),
            valid_record().with("items", "-1"),
            valid_record().with("taxes", "-0.50"),
            valid_record().with("date", "15/01/2024"),
            valid_record().with("payment", "Bitcoin"),
            valid_record().with("items", "2.5"),
            valid_record(),
        ];

        let table = normalize(&records).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_count(), 6);
        assert_eq!(table.len() + table.skipped_count(), records.len());
    }

    #[test]
    fn reports_why_each_record_was_skipped() {
        let records = [
            valid_record(),
            valid_record().with("subtotal", "abc"),
            valid_record().with("items", -3),
            valid_record().with("date", 20240115),
            valid_record().with("payment", "Debit"),
            valid_record().with("items", "two"),
        ];

        let table = normalize(&records).unwrap();
        let errors: Vec<_> = table.skipped().iter().map(|skipped| &skipped.error).collect();

        assert_eq!(
            errors,
            [
                &ValidationError::InvalidNumber {
                    field: Field::Subtotal,
                    value: "\"abc\"".to_owned()
                },
                &ValidationError::NegativeValue {
                    field: Field::Items,
                    value: "-3".to_owned()
                },
                &ValidationError::InvalidDate("20240115".to_owned()),
                &ValidationError::InvalidPaymentMethod("\"Debit\"".to_owned()),
                &ValidationError::InvalidInteger {
                    field: Field::Items,
                    value: "\"two\"".to_owned()
                },
            ]
        );
    }

    #[test]
    fn fails_when_every_record_is_invalid() {
        let records = [
            valid_record().with("date", "yesterday"),
            TransactionRecord::new(),
        ];

        let result = normalize(&records);

        assert_eq!(result, Err(Error::AllRecordsInvalid { skipped: 2 }));
    }

    #[test]
    fn total_is_always_derived() {
        let records = [
            valid_record().with("total", "10.80"),
            valid_record().with("total", "500"),
            valid_record().with("total", "n/a"),
        ];

        let table = normalize(&records).unwrap();

        assert!(table.rows().iter().all(|row| row.total == 10.8));
        assert_eq!(table.total_mismatches(), 2);
    }

    #[test]
    fn table_carries_calendar_orderings() {
        let table = normalize(&[valid_record().with("date", "2024-12-25")]).unwrap();

        assert_eq!(table.month_order(), &MONTH_ORDER);
        assert_eq!(table.month_order()[0], Month::January);
        assert_eq!(table.weekday_order(), &WEEKDAY_ORDER);
        assert_eq!(table.weekday_order()[0], Weekday::Sunday);
    }

    #[test]
    fn keeps_input_order() {
        let records = [
            valid_record().with("date", "2024-05-01"),
            valid_record().with("date", "2023-01-01"),
            valid_record().with("date", "2024-02-01"),
        ];

        let table = normalize(&records).unwrap();
        let dates: Vec<_> = table.rows().iter().map(|row| row.date).collect();

        assert_eq!(
            dates,
            [date!(2024 - 05 - 01), date!(2023 - 01 - 01), date!(2024 - 02 - 01)]
        );
    }
}
