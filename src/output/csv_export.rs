//! CSV export of item records
//!
//! Columns are `title,price,rating,page`, in the field order of `ItemRecord`.

use crate::crawler::ItemRecord;
use crate::output::OutputResult;
use std::io::Write;
use std::path::Path;

/// Writes records as CSV (header row included) to any writer
pub fn write_csv<W: Write>(records: &[ItemRecord], writer: W) -> OutputResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so an empty export still has its header
    csv.write_record(["title", "price", "rating", "page"])?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;

    Ok(())
}

/// Creates (or truncates) `path` and writes the records to it
pub fn export_csv(records: &[ItemRecord], path: &Path) -> OutputResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(records, std::io::BufWriter::new(file))?;

    tracing::info!("Results saved to {}", path.display());
    Ok(())
}
