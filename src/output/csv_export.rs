//! Flat-file CSV export of a scraped batch

use crate::crawler::BookRecord;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Header row, one column per [`BookRecord`] field
pub const CSV_HEADER: [&str; 6] = [
    "Title",
    "Price",
    "Rating",
    "Availability",
    "Category",
    "Image source",
];

/// Writes `records` to a CSV file at `path`, replacing any existing file
///
/// Missing parent directories are created.
pub fn write_csv(records: &[BookRecord], path: &Path) -> Result<(), csv::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Writes the header and one row per record to any writer
pub fn write_csv_to<W: Write>(out: W, records: &[BookRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

fn write_records<W: Write>(
    writer: &mut csv::Writer<W>,
    records: &[BookRecord],
) -> Result<(), csv::Error> {
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(csv_row(record))?;
    }
    Ok(())
}

fn csv_row(record: &BookRecord) -> [String; 6] {
    [
        record.title.clone(),
        record.price.clone(),
        // an unknown rating is written as an empty field
        record.rating.map(|r| r.to_string()).unwrap_or_default(),
        record.availability.clone(),
        record.category.clone(),
        record.image_src.clone(),
    ]
}
