//! CSV export of collected listings.

use crate::models::Listing;
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::info;

pub const COLUMNS: [&str; 7] = [
    "url",
    "price",
    "rooms",
    "area",
    "agency",
    "posted_at",
    "summary",
];

/// Oldest first, undated listings before dated ones
pub fn sort_by_posted(listings: &mut [Listing]) {
    listings.sort_by_key(|l| l.posted_at);
}

pub fn write_csv<W: io::Write>(writer: W, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().quote(b'|').from_writer(writer);
    writer.write_record(COLUMNS)?;

    for listing in listings {
        writer.write_record([
            listing.url.clone(),
            listing.price.map(|p| format!("{:.0}", p)).unwrap_or_default(),
            listing.rooms.map(|r| r.to_string()).unwrap_or_default(),
            listing.area.map(|a| a.to_string()).unwrap_or_default(),
            listing.agency.to_string(),
            listing.posted_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            listing.summary.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, listings)?;
    info!("💾 Exported {} listings to {}", listings.len(), path.display());
    Ok(())
}
