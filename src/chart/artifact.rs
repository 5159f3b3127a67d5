//! The renderable output of the chart builder and the HTML needed to display it.

use maud::{Markup, PreEscaped, html};
use serde::Serialize;

use crate::{aggregation::AggregateView, chart::ChartKind};

/// A chart ready for display.
///
/// Holds the aggregate values the chart was drawn from and the ECharts option
/// object, so callers can lay charts out without knowing how they were built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    id: String,
    title: String,
    kind: ChartKind,
    data: AggregateView,
    options: String,
}

impl ChartArtifact {
    pub(super) fn new(
        id: String,
        title: String,
        kind: ChartKind,
        data: AggregateView,
        options: String,
    ) -> Self {
        Self {
            id,
            title,
            kind,
            data,
            options,
        }
    }

    /// The HTML element ID to use for the chart (kebab-case).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The chart title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// How the chart is drawn.
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// The aggregate values shown in the chart.
    pub fn view(&self) -> &AggregateView {
        &self.data
    }

    /// The ECharts option object.
    ///
    /// This is a JavaScript object literal rather than strict JSON since the
    /// formatters are JavaScript functions.
    pub fn options(&self) -> &str {
        &self.options
    }

    /// A self-contained fragment with the chart container and the script that draws it.
    ///
    /// The page must load ECharts before the fragment runs.
    pub fn to_markup(&self) -> Markup {
        html!(
            div
                id=(self.id)
                class="min-h-[380px] rounded dark:bg-gray-100"
            {}

            script { (PreEscaped(init_script(&self.id, &self.options))) }
        )
    }
}

/// Renders the HTML containers for a page of charts.
pub fn charts_view(charts: &[ChartArtifact]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript that draws every chart in `charts` once the page has loaded.
///
/// Pair with [charts_view], which provides the containers.
pub fn charts_script(charts: &[ChartArtifact]) -> PreEscaped<String> {
    let script_content = charts
        .iter()
        .map(|chart| init_script(&chart.id, &chart.options))
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    ))
}

/// Initializes one ECharts instance with dark mode support and responsive resizing.
fn init_script(id: &str, options: &str) -> String {
    format!(
        r#"(function() {{
            const chartDom = document.getElementById("{id}");
            const chart = echarts.init(chartDom);
            const option = {options};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{
        chart::{ChartKind, build_default_charts},
        normalize::normalize,
        record::TransactionRecord,
    };

    use super::{ChartArtifact, charts_script, charts_view};

    fn test_charts() -> Vec<ChartArtifact> {
        let record = TransactionRecord::new()
            .with("date", "2024-01-15")
            .with("subtotal", "10.00")
            .with("items", "2")
            .with("taxes", "0.80")
            .with("category", "Food")
            .with("payment", "Cash");
        let table = normalize(&[record]).unwrap();

        build_default_charts(&table, &[ChartKind::Pie, ChartKind::Bar])
    }

    #[test]
    fn charts_view_has_one_container_per_chart() {
        let charts = test_charts();

        let html = Html::parse_fragment(&charts_view(&charts).into_string());
        let selector = Selector::parse("section#charts div[id]").unwrap();
        let ids: Vec<_> = html
            .select(&selector)
            .filter_map(|element| element.value().attr("id"))
            .collect();

        assert_eq!(ids, [charts[0].id(), charts[1].id()]);
    }

    #[test]
    fn charts_script_initializes_every_chart() {
        let charts = test_charts();

        let script = charts_script(&charts).into_string();

        assert!(script.starts_with("document.addEventListener('DOMContentLoaded'"));
        for chart in &charts {
            assert!(script.contains(&format!("document.getElementById(\"{}\")", chart.id())));
        }
    }

    #[test]
    fn markup_fragment_is_self_contained() {
        let chart = &test_charts()[0];

        let markup = chart.to_markup().into_string();
        let html = Html::parse_fragment(&markup);
        let container = Selector::parse(&format!("div#{}", chart.id())).unwrap();
        let script = Selector::parse("script").unwrap();

        assert_eq!(html.select(&container).count(), 1);
        assert_eq!(html.select(&script).count(), 1);
        assert!(markup.contains("echarts.init"));
    }
}
