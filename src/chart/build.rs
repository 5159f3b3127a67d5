use crate::{
    Error,
    aggregation::aggregate,
    chart::{ChartArtifact, ChartKind, ChartRenderer, ChartRequest, EChartsRenderer},
    normalize::CanonicalTable,
};

/// Build one chart per request with the default ECharts renderer.
///
/// See [build_charts_with].
pub fn build_charts(table: &CanonicalTable, requests: &[ChartRequest]) -> Vec<ChartArtifact> {
    build_charts_with(&EChartsRenderer, table, requests)
}

/// Build one chart per kind, each drawing the kind's default view.
pub fn build_default_charts(table: &CanonicalTable, kinds: &[ChartKind]) -> Vec<ChartArtifact> {
    let requests: Vec<ChartRequest> = kinds.iter().copied().map(ChartRequest::from).collect();

    build_charts(table, &requests)
}

/// Build one chart per request using `renderer`.
///
/// Charts come back in the order they were requested. An empty table yields no
/// charts. Requests the renderer does not support are logged and skipped.
pub fn build_charts_with<R: ChartRenderer + ?Sized>(
    renderer: &R,
    table: &CanonicalTable,
    requests: &[ChartRequest],
) -> Vec<ChartArtifact> {
    if table.is_empty() {
        tracing::debug!("no transactions, skipping {} chart requests", requests.len());
        return Vec::new();
    }

    let mut charts = Vec::with_capacity(requests.len());

    for (index, request) in requests.iter().enumerate() {
        let view = aggregate(table, request.view);

        if !renderer.supports(request.kind, &view) {
            let error = Error::UnsupportedChart {
                kind: request.kind,
                view: request.view,
            };
            tracing::warn!("skipping chart request {index}: {error}");
            continue;
        }

        let title = request.view.title().to_owned();
        let options = renderer.render(request.kind, &title, &view);
        let id = format!(
            "chart-{}-{}-{}",
            index + 1,
            request.kind,
            request.view.as_str().replace('_', "-")
        );

        charts.push(ChartArtifact::new(id, title, request.kind, view, options));
    }

    charts
}
