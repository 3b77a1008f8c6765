mod bootstrap;
mod render;

use anyhow::{Context, Result};
use vis_core::settings::{OutputFormat, Settings};
use vis_data::presentation::render_all;
use vis_runtime::orchestrator::SelectionOrchestrator;
use vis_runtime::provider::FsFileProvider;

use crate::render::TextChartRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("purchase-vis v{} starting", env!("CARGO_PKG_VERSION"));
    let options = settings.pipeline_options();
    tracing::debug!(?options, "pipeline options");

    let orchestrator = SelectionOrchestrator::new(FsFileProvider, options);
    let (selector, mut outcomes, handle) = orchestrator.start();

    selector.select(settings.file.clone()).await?;
    // A single selection per invocation; closing the sender lets the loop end.
    drop(selector);

    let outcome = outcomes
        .recv()
        .await
        .context("selection loop ended without reporting a result")?;
    handle.join().await;

    let path = outcome.selection.path.display().to_string();
    let visualization = outcome
        .result
        .with_context(|| format!("cannot summarise {}", path))?;

    tracing::info!(
        rows = visualization.stats.rows,
        rows_with_fallbacks = visualization.stats.rows_with_fallbacks,
        invalid_dates = visualization.stats.invalid_dates,
        "summary ready"
    );

    match settings.output_format() {
        OutputFormat::Json => {
            println!("{}", visualization.to_json()?);
        }
        OutputFormat::Text => {
            if visualization.is_empty() {
                println!("No purchase rows in {}", path);
                return Ok(());
            }
            let stdout = std::io::stdout();
            let mut renderer = TextChartRenderer::new(stdout.lock());
            let rendered = render_all(&visualization.charts, &mut renderer)?;
            tracing::debug!(rendered, "charts rendered");
        }
    }

    Ok(())
}
