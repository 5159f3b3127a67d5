//! Turns aggregate views into ECharts chart options.
//!
//! The aggregation logic never touches the charting library directly; it goes
//! through [ChartRenderer] so the backend can be swapped out.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Line, Pie, Scatter},
};

use crate::{aggregation::AggregateView, chart::ChartKind};

/// Builds renderable chart options for each [ChartKind].
pub trait ChartRenderer {
    /// Whether this renderer can draw `view` as a `kind` chart.
    ///
    /// By default lines are only drawn over ordinal keys (weekday, month, year).
    fn supports(&self, kind: ChartKind, view: &AggregateView) -> bool {
        kind != ChartKind::Line || view.view().key().is_ordinal()
    }

    /// Render `view` as a `kind` chart titled `title`, returning the chart
    /// options in the backend's serialized form.
    fn render(&self, kind: ChartKind, title: &str, view: &AggregateView) -> String;
}

/// Renders charts as ECharts option objects using `charming`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EChartsRenderer;

impl ChartRenderer for EChartsRenderer {
    fn render(&self, kind: ChartKind, title: &str, view: &AggregateView) -> String {
        let chart = match kind {
            ChartKind::Pie => pie_chart(title, view),
            ChartKind::Bar => bar_chart(title, view),
            ChartKind::Line => line_chart(title, view),
            ChartKind::Scatter => scatter_chart(title, view),
        };

        chart.to_string()
    }
}

fn pie_chart(title: &str, view: &AggregateView) -> Chart {
    let data: Vec<(f64, &str)> = view.entries().map(|(label, value)| (value, label)).collect();

    Chart::new()
        .title(chart_title(title, view))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("2%"))
        .series(
            Pie::new()
                .name(view.view().measure().label())
                .radius("60%")
                .data(data),
        )
}

fn bar_chart(title: &str, view: &AggregateView) -> Chart {
    axis_chart(title, view).series(
        Bar::new()
            .name(view.view().measure().label())
            .data(view.values().to_vec()),
    )
}

fn line_chart(title: &str, view: &AggregateView) -> Chart {
    axis_chart(title, view).series(
        Line::new()
            .name(view.view().measure().label())
            .data(view.values().to_vec()),
    )
}

fn scatter_chart(title: &str, view: &AggregateView) -> Chart {
    axis_chart(title, view).series(
        Scatter::new()
            .name(view.view().measure().label())
            .data(view.values().to_vec()),
    )
}

/// A chart with the group labels along the x-axis and currency values on the y-axis.
fn axis_chart(title: &str, view: &AggregateView) -> Chart {
    Chart::new()
        .title(chart_title(title, view))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name(view.view().key().label())
                .data(view.labels().to_vec()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
}

fn chart_title(title: &str, view: &AggregateView) -> Title {
    let subtext = format!(
        "{} by {}",
        view.view().measure().label(),
        view.view().key().label().to_lowercase()
    );

    Title::new().text(title).subtext(subtext)
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
