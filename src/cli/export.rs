use std::path::PathBuf;

use crate::cli::{filter_label, filtered_snapshot, open_store, FilterArgs};
use crate::error::Result;
use crate::export::{export, write_export, ExportFormat, ReportContext};
use crate::reports::Totals;
use crate::settings::{load_settings, shellexpand_path};

/// Render the filtered transactions and hand the file to the exports directory.
/// Returns the written path.
pub fn run(format: &str, opts: &FilterArgs, output_dir: Option<String>) -> Result<PathBuf> {
    let format: ExportFormat = format.parse()?;
    let settings = load_settings();
    let store = open_store(&settings)?;
    let rows = filtered_snapshot(&store, opts)?;
    store.close()?;

    let totals = Totals::of(&rows);
    let ctx = ReportContext {
        title: settings.report_title.clone(),
        subtitle: filter_label(opts)?,
        currency_symbol: settings.currency_symbol.clone(),
        generated_at: chrono::Local::now().naive_local(),
    };
    let payload = export(&rows, &totals, format, &ctx)?;

    let dir = output_dir
        .map(|d| PathBuf::from(shellexpand_path(&d)))
        .unwrap_or_else(|| settings.exports_dir());
    let path = write_export(&payload, &dir)?;
    println!(
        "Wrote {} ({} transactions, {})",
        path.display(),
        rows.len(),
        payload.format.extension()
    );
    Ok(path)
}
