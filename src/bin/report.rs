//! Writes the spending dashboard for a file of transaction records to a standalone HTML page.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spendlens::{
    ChartKind, ChartRequest, RecordFormat, build_charts, dashboard_page, normalize,
    parse_chart_requests_or, parse_records, summarize,
};

/// Render spending charts for a JSON or CSV export of transaction records.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The JSON or CSV file holding the transaction records.
    input: PathBuf,

    /// Where to write the HTML page.
    #[arg(short, long, default_value = "spending.html")]
    output: PathBuf,

    /// A chart to draw, e.g. "pie" or "bar:weekday_averages". May be given
    /// more than once. Invalid entries are logged and ignored. Defaults to one
    /// chart of every kind.
    #[arg(long = "chart")]
    charts: Vec<String>,

    /// The title of the page.
    #[arg(long, default_value = "Spending Dashboard")]
    title: String,
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let format = RecordFormat::from_path(&args.input).ok_or_else(|| {
        format!(
            "could not tell the format of {}, expected a .json or .csv file",
            args.input.display()
        )
    })?;

    let text = fs::read_to_string(&args.input)
        .map_err(|error| format!("could not read {}: {error}", args.input.display()))?;

    let records = parse_records(&text, format).map_err(|error| error.to_string())?;
    let table = normalize(&records).map_err(|error| error.to_string())?;

    let every_kind: Vec<_> = ChartKind::ALL.into_iter().map(ChartRequest::from).collect();
    let requests = parse_chart_requests_or(&args.charts, &every_kind);

    let charts = build_charts(&table, &requests);
    let summary = summarize(&table);
    let page = dashboard_page(&args.title, &summary, &charts);

    fs::write(&args.output, page.into_string())
        .map_err(|error| format!("could not write {}: {error}", args.output.display()))?;

    tracing::info!(
        "wrote {} charts for {} transactions to {}",
        charts.len(),
        table.len(),
        args.output.display()
    );

    Ok(())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    tracing_subscriber::registry().with(stdout_log).init();
}
