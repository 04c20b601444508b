use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{Entry, Summary};

/// Write a project's items and costs as `kind,label,amount` rows followed by
/// a total row. Returns the number of entry rows written.
pub(crate) fn write_csv(path: &Path, items: &[Entry], costs: &[Entry]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    wtr.write_record(["kind", "label", "amount"])?;
    for entry in items.iter().chain(costs) {
        wtr.write_record([
            entry.kind.as_str(),
            entry.label.as_str(),
            &format!("{:.2}", entry.magnitude),
        ])?;
    }
    let summary = Summary::of(items, costs);
    wtr.write_record(["Total", "", &format!("{:.2}", summary.total())])?;
    wtr.flush().context("Failed to write export file")?;

    let rows = items.len() + costs.len();
    log::info!("event=export status=ok rows={rows} path={}", path.display());
    Ok(rows)
}

/// `projcost-<slug>.csv` for a project name.
pub(crate) fn default_file_name(project_name: &str) -> String {
    let slug: String = project_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "projcost-export.csv".to_string()
    } else {
        format!("projcost-{slug}.csv")
    }
}
