//! Defines the fixed spending categories and payment methods a transaction can have.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The category of a purchase, e.g., 'Food', 'Utilities'.
///
/// The variants are declared in display order, which is the order used for
/// chart axes and legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Movies, games, events and the like.
    Entertainment,
    /// Clothes and shoes.
    Clothing,
    /// Fuel, fares and vehicle costs.
    Transportation,
    /// Power, water, internet and phone bills.
    Utilities,
    /// Medical and pharmacy expenses.
    Health,
    /// Personal care.
    Personal,
    /// Presents for other people.
    Gift,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Entertainment,
        Category::Clothing,
        Category::Transportation,
        Category::Utilities,
        Category::Health,
        Category::Personal,
        Category::Gift,
        Category::Other,
    ];

    /// The category name as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Clothing => "Clothing",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Personal => "Personal",
            Category::Gift => "Gift",
            Category::Other => "Other",
        }
    }

    /// The position of the category in [Category::ALL].
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    /// Map a category name to a [Category], ignoring case and surrounding whitespace.
    ///
    /// Returns `None` if `name` is blank. Names outside the fixed set map to
    /// [Category::Other].
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();

        if name.is_empty() {
            return None;
        }

        let category = Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                tracing::debug!("unknown category \"{name}\", using \"Other\"");
                Category::Other
            });

        Some(category)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a purchase was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Paid in cash.
    Cash,
    /// Paid by credit card.
    Credit,
}

impl PaymentMethod {
    /// All payment methods in display order.
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Cash, PaymentMethod::Credit];

    /// The payment method name as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Credit => "Credit",
        }
    }

    /// The position of the payment method in [PaymentMethod::ALL].
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    /// Map a payment method name to a [PaymentMethod], ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();

        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
