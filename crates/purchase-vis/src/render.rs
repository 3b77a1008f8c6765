//! Plain-text chart renderer for terminal output.

use std::io::Write;

use vis_core::error::Result;
use vis_core::formatting::{format_amount, format_number, percentage};
use vis_data::presentation::{ChartKind, ChartRenderer};

/// Widest bar, in characters.
const BAR_WIDTH: usize = 40;

/// Draws each chart as a titled block of labelled rows.
///
/// Line and bar charts get a `#` bar scaled to the largest value; pie charts
/// show each slice's share; scatter charts list their points.
pub struct TextChartRenderer<W> {
    out: W,
}

impl<W: Write> TextChartRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn heading(&mut self, target_id: &str, kind: ChartKind, title: &str) -> Result<()> {
        writeln!(self.out, "== {} ({}, {})", title, kind, target_id)?;
        Ok(())
    }
}

impl<W: Write> ChartRenderer for TextChartRenderer<W> {
    fn render(
        &mut self,
        target_id: &str,
        kind: ChartKind,
        labels: &[String],
        series: &[f64],
        title: &str,
    ) -> Result<()> {
        self.heading(target_id, kind, title)?;

        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let max = series.iter().copied().fold(0.0_f64, f64::max);
        let total: f64 = series.iter().sum();

        for (label, value) in labels.iter().zip(series) {
            match kind {
                ChartKind::Pie => writeln!(
                    self.out,
                    "  {:<width$}  {:>6}%  {}",
                    label,
                    format_number(percentage(*value, total, 1), 1),
                    format_amount(*value),
                    width = label_width
                )?,
                _ => writeln!(
                    self.out,
                    "  {:<width$}  {:<bar_width$}  {}",
                    label,
                    bar(*value, max),
                    format_number(*value, 2),
                    width = label_width,
                    bar_width = BAR_WIDTH
                )?,
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Points are `(totalCost, quantity)` pairs.
    fn render_scatter(
        &mut self,
        target_id: &str,
        xs: &[f64],
        ys: &[f64],
        title: &str,
    ) -> Result<()> {
        self.heading(target_id, ChartKind::Scatter, title)?;
        for (x, y) in xs.iter().zip(ys) {
            writeln!(self.out, "  ({}, {})", format_amount(*x), format_number(*y, 2))?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

/// A `#` run proportional to `value / max`; empty for non-positive values.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}
