//! Conversion of summaries into the positional arrays a chart renderer takes.
//!
//! Nothing here aggregates; it only orders keys and picks accumulator fields.

use serde::Serialize;
use vis_core::error::Result;
use vis_core::models::NormalizedRecord;

use crate::aggregator::{GroupSummary, ProductTotals, Summaries};

// ── Series ────────────────────────────────────────────────────────────────────

/// Parallel label and value arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Labels in first-seen key order.
pub fn series<A>(summary: &GroupSummary<A>, value: impl Fn(&A) -> f64) -> Series {
    let (labels, values) = summary
        .iter()
        .map(|(key, acc)| (key.to_string(), value(acc)))
        .unzip();
    Series { labels, values }
}

/// Labels ordered by descending `sort_key`; ties keep first-seen order.
pub fn series_descending<A>(
    summary: &GroupSummary<A>,
    sort_key: impl Fn(&A) -> f64,
    value: impl Fn(&A) -> f64,
) -> Series {
    let mut entries: Vec<(&str, &A)> = summary.iter().collect();
    entries.sort_by(|(_, a), (_, b)| sort_key(*b).total_cmp(&sort_key(*a)));

    let (labels, values) = entries
        .into_iter()
        .map(|(key, acc)| (key.to_string(), value(acc)))
        .unzip();
    Series { labels, values }
}

// ── Chart specs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Scatter,
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ChartData {
    Categorical(Series),
    Scatter { xs: Vec<f64>, ys: Vec<f64> },
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub target_id: String,
    pub kind: ChartKind,
    pub title: String,
    pub data: ChartData,
}

impl ChartSpec {
    fn categorical(target_id: &str, kind: ChartKind, title: &str, series: Series) -> Self {
        Self {
            target_id: target_id.to_string(),
            kind,
            title: title.to_string(),
            data: ChartData::Categorical(series),
        }
    }
}

/// The dashboard's chart set.
///
/// Dates keep first-seen order; products are sorted by descending total cost.
/// Returns no charts at all when there is nothing to summarise.
pub fn chart_specs(summaries: &Summaries, records: &[NormalizedRecord]) -> Vec<ChartSpec> {
    if summaries.is_empty() {
        return Vec::new();
    }

    let by_cost = |p: &ProductTotals| p.total_cost;

    vec![
        ChartSpec::categorical(
            "chart1",
            ChartKind::Line,
            "Total Cost over Time",
            series(&summaries.by_date, |d| d.total_cost),
        ),
        ChartSpec::categorical(
            "chart2",
            ChartKind::Line,
            "Total Quantity over Time",
            series(&summaries.by_date, |d| d.quantity),
        ),
        ChartSpec::categorical(
            "chart3",
            ChartKind::Bar,
            "Total Cost by Store",
            series(&summaries.by_store, |s| s.total_cost),
        ),
        ChartSpec::categorical(
            "chart4",
            ChartKind::Bar,
            "Total Cost by Product",
            series_descending(&summaries.by_product, by_cost, by_cost),
        ),
        ChartSpec::categorical(
            "chart5",
            ChartKind::Pie,
            "Product Cost Distribution",
            series_descending(&summaries.by_product, by_cost, by_cost),
        ),
        ChartSpec::categorical(
            "chart6",
            ChartKind::Bar,
            "Average Price per Product",
            series_descending(&summaries.by_product, by_cost, |p| p.average_cost()),
        ),
        ChartSpec::categorical(
            "chart7",
            ChartKind::Line,
            "Total Weight over Time",
            series(&summaries.by_date, |d| d.weight),
        ),
        ChartSpec {
            target_id: "chart8".to_string(),
            kind: ChartKind::Scatter,
            title: "Total Cost vs Quantity".to_string(),
            data: ChartData::Scatter {
                xs: records.iter().map(|r| r.total_cost).collect(),
                ys: records.iter().map(|r| r.quantity).collect(),
            },
        },
    ]
}

// ── Renderer boundary ─────────────────────────────────────────────────────────

/// The chart drawing collaborator.
pub trait ChartRenderer {
    fn render(
        &mut self,
        target_id: &str,
        kind: ChartKind,
        labels: &[String],
        series: &[f64],
        title: &str,
    ) -> Result<()>;

    fn render_scatter(
        &mut self,
        target_id: &str,
        xs: &[f64],
        ys: &[f64],
        title: &str,
    ) -> Result<()>;
}

/// Hand every spec to `renderer`, in order. Returns the number rendered.
pub fn render_all<R>(specs: &[ChartSpec], renderer: &mut R) -> Result<usize>
where
    R: ChartRenderer + ?Sized,
{
    for spec in specs {
        match &spec.data {
            ChartData::Categorical(series) => renderer.render(
                &spec.target_id,
                spec.kind,
                &series.labels,
                &series.values,
                &spec.title,
            )?,
            ChartData::Scatter { xs, ys } => {
                renderer.render_scatter(&spec.target_id, xs, ys, &spec.title)?
            }
        }
    }
    Ok(specs.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
