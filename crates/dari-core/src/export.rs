use crate::{Listing, Result};
use std::fs::File;
use std::path::Path;

/// Write listings to CSV. The column order comes from the `Listing` field
/// order, which matches the combined dataset layout downstream scripts read.
pub fn write_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a previously exported CSV back into listings.
pub fn read_csv(path: &Path) -> Result<Vec<Listing>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut listings = Vec::new();
    for record in reader.deserialize() {
        listings.push(record?);
    }
    Ok(listings)
}

pub fn write_json(path: &Path, listings: &[Listing]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, listings)?;
    Ok(())
}
