//! Application router and the chart endpoints.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    chart::{ChartArtifact, build_charts, parse_chart_requests},
    endpoints,
    html::dashboard_page,
    normalize::{CanonicalTable, normalize},
    record::TransactionRecord,
    summary::{SpendingSummary, summarize},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::CHARTS_API, post(post_charts))
        .route(endpoints::DASHBOARD_VIEW, post(post_dashboard))
        .route(endpoints::HEALTH, get(get_health))
        .with_state(state)
}

/// The body of a chart or dashboard request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChartsForm {
    /// The user's raw transaction records.
    ///
    /// Entries that are not objects are accepted here and reported as skipped.
    pub records: Vec<TransactionRecord>,

    /// Chart requests such as `"pie"` or `"bar:weekday_averages"`.
    ///
    /// The server's default charts are used when this is empty.
    #[serde(default)]
    pub charts: Vec<String>,
}

/// A record that was left out of the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SkippedRecordResponse {
    index: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ChartsResponse {
    charts: Vec<ChartArtifact>,
    summary: SpendingSummary,
    skipped_records: Vec<SkippedRecordResponse>,
    rejected_charts: Vec<String>,
}

/// The charts built for one request, before they are turned into a response.
struct ChartsOutcome {
    table: CanonicalTable,
    charts: Vec<ChartArtifact>,
    rejected_charts: Vec<String>,
}

/// Check the request against the server limits, then normalize the records and build the charts.
fn build_outcome(state: &AppState, form: &ChartsForm) -> Result<ChartsOutcome, Error> {
    if form.records.len() > state.max_rows() {
        return Err(Error::TooManyRecords {
            count: form.records.len(),
            limit: state.max_rows(),
        });
    }

    let (requests, rejected_charts) = if form.charts.is_empty() {
        (state.default_charts().to_vec(), Vec::new())
    } else {
        parse_chart_requests(&form.charts)
    };

    let table = normalize(&form.records)?;
    let charts = build_charts(&table, &requests);

    tracing::info!(
        "built {} of {} requested charts from {} records",
        charts.len(),
        requests.len(),
        form.records.len()
    );

    Ok(ChartsOutcome {
        table,
        charts,
        rejected_charts,
    })
}

/// Build the chart artifacts for the posted records and return them as JSON.
async fn post_charts(
    State(state): State<AppState>,
    Json(form): Json<ChartsForm>,
) -> Result<Json<Value>, Error> {
    let outcome = build_outcome(&state, &form)?;

    let response = ChartsResponse {
        summary: summarize(&outcome.table),
        skipped_records: outcome
            .table
            .skipped()
            .iter()
            .map(|skipped| SkippedRecordResponse {
                index: skipped.index,
                reason: skipped.error.to_string(),
            })
            .collect(),
        charts: outcome.charts,
        rejected_charts: outcome.rejected_charts,
    };

    serde_json::to_value(response)
        .map(Json)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Render the dashboard page for the posted records.
async fn post_dashboard(State(state): State<AppState>, Json(form): Json<ChartsForm>) -> Response {
    match build_outcome(&state, &form) {
        Ok(outcome) => {
            let summary = summarize(&outcome.table);

            dashboard_page(state.title(), &summary, &outcome.charts).into_response()
        }
        Err(error) => error.into_page_response(),
    }
}

async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
