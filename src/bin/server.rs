use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spendlens::{
    AppState, ServerConfig, build_router, graceful_shutdown, parse_chart_requests_or,
};

/// The REST API server for spendlens.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The maximum number of records accepted in one request.
    #[arg(long, default_value_t = 10_000)]
    max_rows: usize,

    /// The charts to draw when a request does not ask for any, e.g. "pie" or
    /// "bar:weekday_averages". May be given more than once. Invalid entries
    /// are logged and ignored.
    #[arg(long = "chart")]
    charts: Vec<String>,

    /// The title shown on the dashboard page.
    #[arg(long)]
    title: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let mut config = ServerConfig {
        max_rows: args.max_rows,
        ..Default::default()
    };
    config.default_charts = parse_chart_requests_or(&args.charts, &config.default_charts);
    if let Some(title) = args.title {
        config.title = title;
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(AppState::new(config)));

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("the server stopped unexpectedly: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(file) => Some(file),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    let debug_log = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(Arc::new(file))
    });

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but errors are
        // logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
