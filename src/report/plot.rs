//! Bar-chart rendering for the citation-weight report.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::info;

const CHART_SIZE: (u32, u32) = (1280, 800);

/// Render a vertical bar chart of name → citation weight to a PNG.
///
/// Callers pass a ranked, truncated view; the full report would not fit on
/// one canvas. An empty view skips rendering instead of writing an empty
/// canvas.
pub fn render_bar_chart(entries: &[(String, u64)], path: &Path) -> Result<()> {
    if entries.is_empty() {
        info!("no weights to plot, skipping chart");
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_weight = entries.iter().map(|(_, w)| *w).max().unwrap_or(0).max(1);
    let y_top = max_weight + max_weight / 10 + 1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Citation counts by annotation name", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(140)
        .y_label_area_size(80)
        .build_cartesian_2d(0..entries.len(), 0u64..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len().min(20))
        .x_label_formatter(&|idx| {
            entries
                .get(*idx)
                .map(|(name, _)| name.clone())
                .unwrap_or_default()
        })
        .x_desc("Annotation name")
        .y_desc("Citation count")
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(idx, (_, weight))| {
        Rectangle::new([(idx, 0u64), (idx + 1, *weight)], BLUE.filled())
    }))?;

    root.present()
        .with_context(|| format!("writing chart to {}", path.display()))?;
    info!(path = %path.display(), bars = entries.len(), "rendered citation chart");
    Ok(())
}
