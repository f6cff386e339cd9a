use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;

/// Write the rows of `view` as CSV with the normalized column names
/// (`Country`, `Team Name`, `BMI`). Returns the number of rows written.
pub fn export_csv<W: Write>(view: &FilteredView, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut n = 0;
    for rec in view.rows() {
        csv.serialize(rec)
            .with_context(|| format!("writing row for athlete {}", rec.id))?;
        n += 1;
    }
    csv.flush().context("flushing CSV output")?;
    Ok(n)
}

pub fn export_csv_file(view: &FilteredView, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let n = export_csv(view, file)?;
    log::info!("Exported {n} rows to {}", path.display());
    Ok(n)
}
