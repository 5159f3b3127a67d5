//! Spendlens turns a user's raw purchase history into spending charts.
//!
//! Raw transaction records go through two steps:
//! 1. [normalize] validates and coerces them into a [CanonicalTable].
//! 2. [aggregate] and [build_charts] group the table into named views and
//!    render each one as an ECharts [ChartArtifact].
//!
//! The canonical rows can also be handed to a [RecommendationEngine] for
//! written spending advice.
//!
//! This library also provides a small REST API that serves the charts as JSON
//! or as a dashboard HTML page.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod aggregation;
mod app_state;
mod calendar;
mod category;
mod chart;
mod endpoints;
mod html;
mod import;
mod normalize;
mod record;
mod recommendation;
mod routing;
mod summary;

#[cfg(test)]
mod test_utils;

pub use aggregation::{AggregateView, GroupKey, Measure, Reduction, View, aggregate};
pub use app_state::{AppState, ServerConfig};
pub use category::{Category, PaymentMethod};
pub use chart::{
    ChartArtifact, ChartKind, ChartRenderer, ChartRequest, EChartsRenderer, build_charts,
    build_charts_with, build_default_charts, parse_chart_requests, parse_chart_requests_or,
};
pub use html::{dashboard_page, format_currency};
pub use import::{RecordFormat, parse_records};
pub use normalize::{
    CanonicalRow, CanonicalTable, MAX_AMOUNT, SkippedRecord, ValidationError, normalize,
};
pub use record::{Field, TransactionRecord};
pub use recommendation::{
    FINANCIAL_ADVICE_TEMPLATE, RecommendError, RecommendationEngine, RecommendationRequest,
    Recommendations, recommend,
};
pub use routing::build_router;
pub use summary::{SpendingSummary, summarize};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Every record in a non-empty batch failed validation.
    ///
    /// A batch with at least one valid record is not an error, the invalid
    /// records are skipped and counted instead.
    #[error("all {skipped} records failed validation")]
    AllRecordsInvalid {
        /// The number of records that were skipped.
        skipped: usize,
    },

    /// A request carried more records than the server accepts.
    #[error("got {count} records, but at most {limit} are accepted")]
    TooManyRecords {
        /// The number of records in the request.
        count: usize,
        /// The configured maximum.
        limit: usize,
    },

    /// A chart request named a chart kind that does not exist.
    #[error("\"{0}\" is not a chart kind, expected one of pie, bar, line or scatter")]
    UnsupportedChartKind(String),

    /// A chart request named an aggregate view that does not exist.
    #[error("\"{0}\" is not an aggregate view")]
    UnsupportedView(String),

    /// The chart kind cannot draw the view, e.g. a line over categories.
    #[error("a {kind} chart cannot draw the view {view}")]
    UnsupportedChart {
        /// The requested chart kind.
        kind: ChartKind,
        /// The requested view.
        view: View,
    },

    /// The records could not be read as JSON.
    #[error("could not parse the records as JSON: {0}")]
    InvalidJson(String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The recommendation engine replied with something other than ten points.
    #[error("could not parse the recommendations: {0}")]
    InvalidRecommendations(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::TooManyRecords { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::AllRecordsInvalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::UnsupportedChartKind(_)
            | Error::UnsupportedView(_)
            | Error::UnsupportedChart { .. }
            | Error::InvalidJson(_)
            | Error::InvalidCSV(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRecommendations(_) | Error::JSONSerializationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Render the error as a full HTML page for the dashboard route.
    fn into_page_response(self) -> Response {
        let status = self.status_code();

        let description = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "Sorry, something went wrong.".to_owned()
        } else {
            self.to_string()
        };

        (status, html::error_page(status, &description)).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are not intended to be shown to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "an unexpected error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
