//! The dashboard HTML page and shared page templates.

use std::sync::OnceLock;

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::{
    chart::{ChartArtifact, charts_script, charts_view},
    summary::SpendingSummary,
};

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";
const TAILWIND_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4";

// Table styles
const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";
const TABLE_CELL_STYLE: &str = "px-6 py-4";
const TABLE_HEADER_CELL_STYLE: &str =
    "px-6 py-4 font-medium text-gray-900 dark:text-white text-left";

// Page container
const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub(crate) enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub(crate) fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Spendlens" }

                script src=(TAILWIND_SCRIPT) {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

/// Renders the dashboard page with a spending summary and every chart in `charts`.
///
/// If there are no transactions, a page explaining that there is nothing to
/// show yet is rendered instead.
pub fn dashboard_page(title: &str, summary: &SpendingSummary, charts: &[ChartArtifact]) -> Markup {
    if summary.transactions == 0 {
        return dashboard_no_data_view(title, summary.skipped);
    }

    let content = html!(
        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-2xl font-bold mb-4" { (title) }

            (charts_view(charts))

            (summary_table(summary))

            @if summary.skipped > 0 {
                p id="skipped-records" class="text-sm text-gray-600 dark:text-gray-400 mt-4"
                {
                    (skipped_message(summary.skipped))
                }
            }
        }
    );

    let head_elements = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        HeadElement::ScriptSource(charts_script(charts)),
    ];

    base(title, &head_elements, &content)
}

fn dashboard_no_data_view(title: &str, skipped: usize) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once there are some transactions to look at."
            }

            @if skipped > 0 {
                p id="skipped-records" { (skipped_message(skipped)) }
            }
        }
    );

    base(title, &[], &content)
}

fn skipped_message(skipped: usize) -> String {
    match skipped {
        1 => "1 record was skipped because it could not be read.".to_owned(),
        n => format!("{n} records were skipped because they could not be read."),
    }
}

fn summary_table(summary: &SpendingSummary) -> Markup {
    let period = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => String::new(),
    };

    let rows = [
        ("Transactions", summary.transactions.to_string()),
        ("Items", summary.items.to_string()),
        ("Subtotal", format_currency(summary.subtotal)),
        ("Taxes", format_currency(summary.taxes)),
        ("Total Spent", format_currency(summary.total)),
        ("Average Transaction", format_currency(summary.average_total)),
        ("Period", period),
    ];

    html! {
        div class="w-full" {
            h3 class="text-xl font-semibold mb-4" { "Summary" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="summary" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    tbody {
                        @for (label, value) in &rows {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_HEADER_CELL_STYLE) { (label) }
                                td class=(TABLE_CELL_STYLE) { (value) }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub(crate) fn error_page(status: StatusCode, description: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (status.as_u16())
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (status.canonical_reason().unwrap_or("Error"))
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (description)
                    }
                }
            }
        }
    );

    base("Error", &[], &content)
}

/// Formats `number` as dollars and cents, e.g. "$12.30".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    let formatted = if number < 0.0 {
        negative_fmt
            .as_ref()
            .map(|formatter| formatter.fmt_string(number.abs()))
    } else if number > 0.0 {
        positive_fmt
            .as_ref()
            .map(|formatter| formatter.fmt_string(number))
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        Some("$0.00".to_owned())
    };

    let Some(mut formatted_string) = formatted else {
        return format!("${number:.2}");
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.len() >= 3 && formatted_string.as_bytes()[formatted_string.len() - 3] != b'.'
    {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}
