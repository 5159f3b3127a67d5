//! The hand-off to the spending recommendation engine.
//!
//! The engine itself (an LLM behind some API) lives outside this crate. It is
//! passed in by the caller as a [RecommendationEngine], and its errors are
//! returned untouched in [RecommendError::Engine].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    Error,
    normalize::{CanonicalRow, CanonicalTable, normalize},
    record::{Field, TransactionRecord},
};

/// The prompt given to the recommendation engine.
///
/// `{format_instructions}` and `{data}` are replaced by [RecommendationRequest::from_table].
pub const FINANCIAL_ADVICE_TEMPLATE: &str = "\
Answer the user query based on the provided format instructions and transaction data,
{format_instructions}
{data}

Pretend you are a financial advisor, and you have been given data with the following schema:
- transactionDate: the date of the transaction
- transactionSubtotal: the subtotal of the transaction
- transactionItems: the total amount of items
- transactionTaxes: the total taxes
- transactionTotal: the subtotal plus taxes
- transactionCategory: the category of the purchase
- transactionPayment: the method of payment

Make ten points of recommendations based on the data, each point should be a recommendation based on the data
and be around a paragraph long, be as detailed as possible and refer to legitimate data for each point.

When I refer to a paragraph I mean a block of seven sentences each containing a minimum of 15 words, you are required
to have at least one paragraph for each point.
";

const FORMAT_INSTRUCTIONS: &str = "\
The output must be a JSON object with exactly the string keys \"point_1\", \"point_2\", \"point_3\", \
\"point_4\", \"point_5\", \"point_6\", \"point_7\", \"point_8\", \"point_9\" and \"point_10\", \
each holding one recommendation based on the transaction data.";

/// Ten spending recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Recommendations {
    pub point_1: String,
    pub point_2: String,
    pub point_3: String,
    pub point_4: String,
    pub point_5: String,
    pub point_6: String,
    pub point_7: String,
    pub point_8: String,
    pub point_9: String,
    pub point_10: String,
}

impl Recommendations {
    /// The recommendations in order.
    pub fn points(&self) -> [&str; 10] {
        [
            &self.point_1,
            &self.point_2,
            &self.point_3,
            &self.point_4,
            &self.point_5,
            &self.point_6,
            &self.point_7,
            &self.point_8,
            &self.point_9,
            &self.point_10,
        ]
    }

    /// Parse the JSON object produced by an LLM.
    ///
    /// Markdown code fences around the object are ignored. The text of each
    /// point is taken as-is.
    ///
    /// # Errors
    /// Returns [Error::InvalidRecommendations] if the text is not a JSON object
    /// with all ten string fields.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let text = text.trim();
        let text = text
            .strip_prefix("```json")
            .or_else(|| text.strip_prefix("```"))
            .and_then(|inner| inner.trim_end().strip_suffix("```"))
            .unwrap_or(text);

        serde_json::from_str(text)
            .map_err(|error| Error::InvalidRecommendations(error.to_string()))
    }
}

/// Everything the recommendation engine is given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    /// The filled in [FINANCIAL_ADVICE_TEMPLATE].
    pub prompt: String,
    /// The validated transactions as a JSON array of records.
    pub data: Value,
}

impl RecommendationRequest {
    /// Build the request from the rows of `table`.
    pub fn from_table(table: &CanonicalTable) -> Self {
        let data = Value::Array(table.rows().iter().map(row_to_json).collect());

        let prompt = FINANCIAL_ADVICE_TEMPLATE
            .replace("{format_instructions}", FORMAT_INSTRUCTIONS)
            .replace("{data}", &data.to_string());

        Self { prompt, data }
    }
}

fn row_to_json(row: &CanonicalRow) -> Value {
    let mut object = Map::new();
    object.insert(Field::Date.key().to_owned(), json!(row.date.to_string()));
    object.insert(Field::Subtotal.key().to_owned(), json!(row.subtotal));
    object.insert(Field::Items.key().to_owned(), json!(row.items));
    object.insert(Field::Taxes.key().to_owned(), json!(row.taxes));
    object.insert(Field::Total.key().to_owned(), json!(row.total));
    object.insert(Field::Category.key().to_owned(), json!(row.category.as_str()));
    object.insert(
        Field::PaymentMethod.key().to_owned(),
        json!(row.payment_method.as_str()),
    );

    Value::Object(object)
}

/// Something that can turn transaction data into ten recommendations.
pub trait RecommendationEngine {
    /// The error the engine fails with, e.g. a network or API error.
    type Error;

    /// Produce recommendations for `request`.
    fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendations, Self::Error>;
}

/// The ways [recommend] can fail.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError<E> {
    /// The records could not be normalized.
    #[error(transparent)]
    Data(Error),

    /// The engine failed. The error is passed through unchanged.
    #[error("the recommendation engine failed: {0}")]
    Engine(E),
}

/// Normalize `records` and ask `engine` for recommendations.
///
/// Returns `Ok(None)` without calling the engine when there are no transactions.
///
/// # Errors
/// Returns [RecommendError::Data] if every record is invalid, or
/// [RecommendError::Engine] with the engine's own error if the engine fails.
pub fn recommend<E: RecommendationEngine + ?Sized>(
    engine: &E,
    records: &[TransactionRecord],
) -> Result<Option<Recommendations>, RecommendError<E::Error>> {
    let table = normalize(records).map_err(RecommendError::Data)?;

    if table.is_empty() {
        tracing::debug!("no transactions, skipping recommendations");
        return Ok(None);
    }

    let request = RecommendationRequest::from_table(&table);

    engine
        .recommend(&request)
        .map(Some)
        .map_err(RecommendError::Engine)
}
