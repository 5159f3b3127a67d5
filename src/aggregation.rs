//! Grouped summaries of the canonical transaction table.
//!
//! Every view groups rows by one categorical key and reduces one measure with
//! a sum or a mean. Groups are emitted in the key's fixed display order (see
//! [crate::calendar] and [crate::category]) so the same input always yields the
//! same axis layout.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    calendar::{month_ordinal, weekday_ordinal},
    normalize::{CanonicalRow, CanonicalTable, round_cents},
};

/// The column rows are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// The spending category.
    Category,
    /// Cash or credit.
    PaymentMethod,
    /// The day of the week.
    Weekday,
    /// The calendar month, combined across years.
    Month,
    /// The year.
    Year,
}

impl GroupKey {
    /// Whether the key has a natural sequence that makes sense on a line chart.
    pub fn is_ordinal(&self) -> bool {
        matches!(self, GroupKey::Weekday | GroupKey::Month | GroupKey::Year)
    }

    /// The axis name for the key.
    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::Category => "Category",
            GroupKey::PaymentMethod => "Payment Method",
            GroupKey::Weekday => "Weekday",
            GroupKey::Month => "Month",
            GroupKey::Year => "Year",
        }
    }

    fn position(&self, row: &CanonicalRow) -> i64 {
        match self {
            GroupKey::Category => row.category.ordinal() as i64,
            GroupKey::PaymentMethod => row.payment_method.ordinal() as i64,
            GroupKey::Weekday => weekday_ordinal(row.weekday) as i64,
            GroupKey::Month => month_ordinal(row.month) as i64,
            GroupKey::Year => row.year as i64,
        }
    }

    fn group_label(&self, row: &CanonicalRow) -> String {
        match self {
            GroupKey::Category => row.category.to_string(),
            GroupKey::PaymentMethod => row.payment_method.to_string(),
            GroupKey::Weekday => row.weekday.to_string(),
            GroupKey::Month => row.month.to_string(),
            GroupKey::Year => row.year.to_string(),
        }
    }
}

/// The numeric column that is reduced within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// The transaction total after taxes.
    Total,
    /// The taxes paid.
    Taxes,
}

impl Measure {
    /// The axis name for the measure.
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Total => "Total",
            Measure::Taxes => "Taxes",
        }
    }

    fn of(&self, row: &CanonicalRow) -> f64 {
        match self {
            Measure::Total => row.total,
            Measure::Taxes => row.taxes,
        }
    }
}

/// How the measure is combined within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Add up the values.
    Sum,
    /// Average the values.
    Mean,
}

/// The named summaries that can be computed from a [CanonicalTable].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Total spent per category.
    CategoryTotals,
    /// Total spent per payment method.
    PaymentMethodTotals,
    /// Average transaction total per day of the week.
    WeekdayAverages,
    /// Total spent per calendar month.
    MonthlyTotals,
    /// Average transaction total per calendar month.
    MonthlyAverages,
    /// Average transaction total per year.
    YearlyAverageTotals,
    /// Average taxes paid per transaction per year.
    YearlyAverageTaxes,
}

impl View {
    /// Every view.
    pub const ALL: [View; 7] = [
        View::CategoryTotals,
        View::PaymentMethodTotals,
        View::WeekdayAverages,
        View::MonthlyTotals,
        View::MonthlyAverages,
        View::YearlyAverageTotals,
        View::YearlyAverageTaxes,
    ];

    /// The column the view groups by.
    pub fn key(&self) -> GroupKey {
        match self {
            View::CategoryTotals => GroupKey::Category,
            View::PaymentMethodTotals => GroupKey::PaymentMethod,
            View::WeekdayAverages => GroupKey::Weekday,
            View::MonthlyTotals | View::MonthlyAverages => GroupKey::Month,
            View::YearlyAverageTotals | View::YearlyAverageTaxes => GroupKey::Year,
        }
    }

    /// The column the view summarizes.
    pub fn measure(&self) -> Measure {
        match self {
            View::YearlyAverageTaxes => Measure::Taxes,
            _ => Measure::Total,
        }
    }

    /// How the view combines values within a group.
    pub fn reduction(&self) -> Reduction {
        match self {
            View::CategoryTotals | View::PaymentMethodTotals | View::MonthlyTotals => {
                Reduction::Sum
            }
            View::WeekdayAverages
            | View::MonthlyAverages
            | View::YearlyAverageTotals
            | View::YearlyAverageTaxes => Reduction::Mean,
        }
    }

    /// The identifier used in chart requests, e.g. "monthly_totals".
    pub fn as_str(&self) -> &'static str {
        match self {
            View::CategoryTotals => "category_totals",
            View::PaymentMethodTotals => "payment_method_totals",
            View::WeekdayAverages => "weekday_averages",
            View::MonthlyTotals => "monthly_totals",
            View::MonthlyAverages => "monthly_averages",
            View::YearlyAverageTotals => "yearly_average_totals",
            View::YearlyAverageTaxes => "yearly_average_taxes",
        }
    }

    /// A human readable title for charts of this view.
    pub fn title(&self) -> &'static str {
        match self {
            View::CategoryTotals => "Spending by Category",
            View::PaymentMethodTotals => "Spending by Payment Method",
            View::WeekdayAverages => "Average Purchase by Weekday",
            View::MonthlyTotals => "Spending by Month",
            View::MonthlyAverages => "Average Purchase by Month",
            View::YearlyAverageTotals => "Average Purchase by Year",
            View::YearlyAverageTaxes => "Average Taxes by Year",
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        View::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedView(s.to_owned()))
    }
}

/// The result of computing a [View]: one value per non-empty group, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    view: View,
    labels: Vec<String>,
    values: Vec<f64>,
}

impl AggregateView {
    /// The view that produced these values.
    pub fn view(&self) -> View {
        self.view
    }

    /// The group labels in display order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The reduced values, rounded to cents, aligned with [AggregateView::labels].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(label, value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// The value for the group `label`, if the group has any rows.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries()
            .find(|(group, _)| *group == label)
            .map(|(_, value)| value)
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn reduce(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Sum => self.sum,
            Reduction::Mean if self.count == 0 => 0.0,
            Reduction::Mean => self.sum / self.count as f64,
        }
    }
}

/// Compute `view` over the rows of `table`.
///
/// Groups with no rows are left out. An empty table gives an empty view.
pub fn aggregate(table: &CanonicalTable, view: View) -> AggregateView {
    let key = view.key();
    let measure = view.measure();

    // Keyed by display position so iteration order is the display order.
    let mut groups: BTreeMap<i64, (String, Accumulator)> = BTreeMap::new();

    for row in table.rows() {
        let (_, accumulator) = groups
            .entry(key.position(row))
            .or_insert_with(|| (key.group_label(row), Accumulator::default()));

        accumulator.sum += measure.of(row);
        accumulator.count += 1;
    }

    let (labels, values): (Vec<String>, Vec<f64>) = groups
        .into_values()
        .map(|(label, accumulator)| (label, round_cents(accumulator.reduce(view.reduction()))))
        .unzip();

    AggregateView {
        view,
        labels,
        values,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, normalize::normalize, record::TransactionRecord};

    use super::{GroupKey, Reduction, View, aggregate};

    fn record(
        date: &str,
        subtotal: &str,
        taxes: &str,
        category: &str,
        payment: &str,
    ) -> TransactionRecord {
        TransactionRecord::new()
            .with("date", date)
            .with("subtotal", subtotal)
            .with("items", "1")
            .with("taxes", taxes)
            .with("category", category)
            .with("payment", payment)
    }

    fn example_records() -> Vec<TransactionRecord> {
        vec![
            record("2024-01-15", "10.00", "0.80", "Food", "Cash"),
            record("2024-01-20", "5.00", "0.40", "Food", "Credit"),
            record("2024-02-01", "30.00", "2.40", "Entertainment", "Credit"),
        ]
    }

    #[test]
    fn category_totals_sum_totals() {
        let table = normalize(&example_records()).unwrap();

        let view = aggregate(&table, View::CategoryTotals);

        assert_eq!(view.labels(), ["Food", "Entertainment"]);
        assert_eq!(view.values(), [16.2, 32.4]);
    }

    #[test]
    fn monthly_totals_are_in_calendar_order() {
        let mut records = example_records();
        records.reverse();
        let table = normalize(&records).unwrap();

        let view = aggregate(&table, View::MonthlyTotals);

        assert_eq!(view.labels(), ["January", "February"]);
        assert_eq!(view.values(), [16.2, 32.4]);
    }

    #[test]
    fn months_are_combined_across_years() {
        let records = vec![
            record("2024-03-10", "10.00", "0.00", "Food", "Cash"),
            record("2023-03-11", "20.00", "0.00", "Food", "Cash"),
            record("2023-12-01", "5.00", "0.00", "Food", "Cash"),
        ];
        let table = normalize(&records).unwrap();

        let totals = aggregate(&table, View::MonthlyTotals);
        let averages = aggregate(&table, View::MonthlyAverages);

        assert_eq!(totals.labels(), ["March", "December"]);
        assert_eq!(totals.values(), [30.0, 5.0]);
        assert_eq!(averages.values(), [15.0, 5.0]);
    }

    #[test]
    fn weekday_averages_start_on_sunday() {
        let records = vec![
            // Saturday
            record("2024-01-20", "10.00", "0.00", "Food", "Cash"),
            // Monday
            record("2024-01-15", "4.00", "0.00", "Food", "Cash"),
            record("2024-01-22", "8.00", "0.00", "Food", "Cash"),
            // Sunday
            record("2024-01-21", "3.00", "0.00", "Food", "Cash"),
        ];
        let table = normalize(&records).unwrap();

        let view = aggregate(&table, View::WeekdayAverages);

        assert_eq!(view.labels(), ["Sunday", "Monday", "Saturday"]);
        assert_eq!(view.values(), [3.0, 6.0, 10.0]);
    }

    #[test]
    fn payment_method_totals_put_cash_first() {
        let mut records = example_records();
        records.reverse();
        let table = normalize(&records).unwrap();

        let view = aggregate(&table, View::PaymentMethodTotals);

        assert_eq!(view.labels(), ["Cash", "Credit"]);
        assert_eq!(view.values(), [10.8, 37.8]);
    }

    #[test]
    fn yearly_averages_cover_totals_and_taxes() {
        let records = vec![
            record("2025-06-01", "10.00", "1.00", "Food", "Cash"),
            record("2023-06-01", "20.00", "2.00", "Food", "Cash"),
            record("2023-07-01", "40.00", "3.00", "Food", "Cash"),
        ];
        let table = normalize(&records).unwrap();

        let totals = aggregate(&table, View::YearlyAverageTotals);
        let taxes = aggregate(&table, View::YearlyAverageTaxes);

        assert_eq!(totals.labels(), ["2023", "2025"]);
        assert_eq!(totals.values(), [32.5, 11.0]);
        assert_eq!(taxes.values(), [2.5, 1.0]);
    }

    #[test]
    fn means_are_rounded_to_cents() {
        let records = vec![
            record("2024-01-01", "1.00", "0.00", "Food", "Cash"),
            record("2024-01-01", "1.00", "0.00", "Food", "Cash"),
            record("2024-01-01", "2.00", "0.00", "Food", "Cash"),
        ];
        let table = normalize(&records).unwrap();

        let view = aggregate(&table, View::YearlyAverageTotals);

        assert_eq!(view.get("2024"), Some(1.33));
    }

    #[test]
    fn empty_table_gives_empty_view() {
        let table = normalize(&[]).unwrap();

        for view in View::ALL {
            assert!(aggregate(&table, view).is_empty());
        }
    }

    #[test]
    fn aggregation_is_deterministic() {
        let table = normalize(&example_records()).unwrap();

        for view in View::ALL {
            assert_eq!(aggregate(&table, view), aggregate(&table, view));
        }
    }

    #[test]
    fn view_metadata() {
        assert_eq!(View::MonthlyTotals.key(), GroupKey::Month);
        assert_eq!(View::MonthlyTotals.reduction(), Reduction::Sum);
        assert_eq!(View::WeekdayAverages.reduction(), Reduction::Mean);
        assert!(GroupKey::Year.is_ordinal());
        assert!(!GroupKey::Category.is_ordinal());
    }

    #[test]
    fn parses_view_names() {
        assert_eq!("monthly_totals".parse::<View>(), Ok(View::MonthlyTotals));
        assert_eq!(" Category_Totals ".parse::<View>(), Ok(View::CategoryTotals));
        assert_eq!(
            "hourly_totals".parse::<View>(),
            Err(Error::UnsupportedView("hourly_totals".to_owned()))
        );
    }
}
