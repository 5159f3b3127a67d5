//! Fixed calendar orderings used for grouping and chart axes.
//!
//! Months and weekdays are always shown in calendar order, never in the order
//! they were first seen or in alphabetical order.

use time::{Month, Weekday};

/// The months of the year, January first.
pub const MONTH_ORDER: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The days of the week, Sunday first.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Sunday,
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
];

/// The position of `month` in [MONTH_ORDER].
pub fn month_ordinal(month: Month) -> usize {
    month as usize - 1
}

/// The position of `weekday` in [WEEKDAY_ORDER].
pub fn weekday_ordinal(weekday: Weekday) -> usize {
    weekday.number_days_from_sunday() as usize
}
