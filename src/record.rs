//! The raw, untrusted shape of a transaction as it arrives from storage.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A logical field of a transaction record.
///
/// Each field is looked up by its canonical key first and then by a short alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The date of the purchase.
    Date,
    /// The amount before taxes.
    Subtotal,
    /// The number of items purchased.
    Items,
    /// The taxes paid.
    Taxes,
    /// The amount after taxes, optional since it is derived from the subtotal and taxes.
    Total,
    /// The spending category.
    Category,
    /// Cash or credit.
    PaymentMethod,
}

impl Field {
    /// The key used by the transaction store.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Date => "transactionDate",
            Field::Subtotal => "transactionSubtotal",
            Field::Items => "transactionItems",
            Field::Taxes => "transactionTaxes",
            Field::Total => "transactionTotal",
            Field::Category => "transactionCategory",
            Field::PaymentMethod => "transactionPayment",
        }
    }

    /// The short alternative key.
    pub fn alias(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Subtotal => "subtotal",
            Field::Items => "items",
            Field::Taxes => "taxes",
            Field::Total => "total",
            Field::Category => "category",
            Field::PaymentMethod => "payment",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A single transaction as a plain key-value mapping.
///
/// Values may be JSON strings or numbers. Any JSON value deserializes into a
/// record so that a malformed entry is rejected on its own by
/// [crate::normalize] instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRecord(Value);

impl TransactionRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Set `key` to `value`, replacing any existing value.
    ///
    /// A record that is not an object is replaced by an object holding only `key`.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_owned(), value.into());
        }
        self
    }

    /// Get the value for `field`, trying the canonical key before the alias.
    ///
    /// JSON `null` is treated the same as a missing key.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0
            .get(field.key())
            .or_else(|| self.0.get(field.alias()))
            .filter(|value| !value.is_null())
    }

    /// Whether the record is a JSON object.
    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    /// The record as it was received.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The number of keys in the record, zero if it is not an object.
    pub fn len(&self) -> usize {
        self.0.as_object().map_or(0, Map::len)
    }

    /// Whether the record has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for TransactionRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

impl From<Value> for TransactionRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for TransactionRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(Value::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        ))
    }
}
