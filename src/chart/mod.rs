//! Chart kinds, chart requests and the chart builder.
//!
//! A chart request pairs a [ChartKind] with the aggregate [View] to draw.
//! Requests can be written as strings, either just the kind (`"pie"`), which
//! draws the kind's default view, or the kind and view (`"bar:weekday_averages"`).

mod artifact;
mod build;
mod render;

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, aggregation::View};

pub use artifact::{ChartArtifact, charts_script, charts_view};
pub use build::{build_charts, build_charts_with, build_default_charts};
pub use render::{ChartRenderer, EChartsRenderer};

/// The visual form of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Slices sized by value, named by group.
    Pie,
    /// One bar per group.
    Bar,
    /// Values joined in the order of an ordinal key such as month or year.
    Line,
    /// Unconnected points, one per group.
    Scatter,
}

impl ChartKind {
    /// Every chart kind.
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
    ];

    /// The lowercase name used in chart requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
        }
    }

    /// The view drawn when a request names only the kind.
    pub fn default_view(&self) -> View {
        match self {
            ChartKind::Pie => View::CategoryTotals,
            ChartKind::Bar => View::MonthlyTotals,
            ChartKind::Line => View::YearlyAverageTotals,
            ChartKind::Scatter => View::WeekdayAverages,
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedChartKind(s.to_owned()))
    }
}

/// A chart to build: which view to aggregate and how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartRequest {
    /// How to draw the chart.
    pub kind: ChartKind,
    /// What to aggregate.
    pub view: View,
}

impl ChartRequest {
    /// Create a request for drawing `view` as a `kind` chart.
    pub fn new(kind: ChartKind, view: View) -> Self {
        Self { kind, view }
    }
}

impl From<ChartKind> for ChartRequest {
    fn from(kind: ChartKind) -> Self {
        Self::new(kind, kind.default_view())
    }
}

impl Display for ChartRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.view)
    }
}

impl FromStr for ChartRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((kind, view)) => Ok(Self::new(kind.parse()?, view.parse()?)),
            None => s.parse::<ChartKind>().map(Self::from),
        }
    }
}

/// Parse chart request strings, skipping the ones that name an unknown kind or view.
///
/// Returns the parsed requests in their original order, followed by the
/// strings that were rejected.
pub fn parse_chart_requests<S: AsRef<str>>(requests: &[S]) -> (Vec<ChartRequest>, Vec<String>) {
    let mut parsed = Vec::with_capacity(requests.len());
    let mut rejected = Vec::new();

    for request in requests {
        let request = request.as_ref();

        match request.parse::<ChartRequest>() {
            Ok(chart_request) => parsed.push(chart_request),
            Err(error) => {
                tracing::warn!("ignoring chart request \"{request}\": {error}");
                rejected.push(request.to_owned());
            }
        }
    }

    (parsed, rejected)
}

/// Parse chart requests given on the command line.
///
/// Invalid entries are logged and skipped. `defaults` is used when no entry
/// was given or none of them could be parsed.
pub fn parse_chart_requests_or<S: AsRef<str>>(
    requests: &[S],
    defaults: &[ChartRequest],
) -> Vec<ChartRequest> {
    let (parsed, rejected) = parse_chart_requests(requests);

    if parsed.is_empty() {
        if !rejected.is_empty() {
            tracing::warn!("none of the requested charts were valid, using the defaults");
        }
        return defaults.to_vec();
    }

    parsed
}
