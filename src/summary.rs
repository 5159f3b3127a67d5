//! Headline figures for a user's spending.

use serde::Serialize;
use time::Date;

use crate::normalize::{CanonicalTable, round_cents};

/// Totals and averages across every row of a [CanonicalTable].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    /// The number of valid transactions.
    pub transactions: usize,
    /// The number of items bought across all transactions.
    pub items: u64,
    /// The sum of all subtotals.
    pub subtotal: f64,
    /// The sum of all taxes.
    pub taxes: f64,
    /// The sum of all totals.
    pub total: f64,
    /// The mean transaction total.
    pub average_total: f64,
    /// The date of the earliest transaction.
    pub first_date: Option<Date>,
    /// The date of the latest transaction.
    pub last_date: Option<Date>,
    /// The number of records that were skipped during normalization.
    pub skipped: usize,
}

/// Summarize the rows of `table`.
///
/// Amounts are rounded to cents. An empty table gives zero amounts and no dates.
pub fn summarize(table: &CanonicalTable) -> SpendingSummary {
    let rows = table.rows();

    let subtotal: f64 = rows.iter().map(|row| row.subtotal).sum();
    let taxes: f64 = rows.iter().map(|row| row.taxes).sum();
    let total: f64 = rows.iter().map(|row| row.total).sum();
    let average_total = if rows.is_empty() {
        0.0
    } else {
        total / rows.len() as f64
    };

    SpendingSummary {
        transactions: rows.len(),
        items: rows.iter().map(|row| u64::from(row.items)).sum(),
        subtotal: round_cents(subtotal),
        taxes: round_cents(taxes),
        total: round_cents(total),
        average_total: round_cents(average_total),
        first_date: rows.iter().map(|row| row.date).min(),
        last_date: rows.iter().map(|row| row.date).max(),
        skipped: table.skipped_count(),
    }
}
