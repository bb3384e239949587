use crate::models::Listing;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Listings collected by earlier runs, one JSON file per area code
pub struct ListingCache {
    path: PathBuf,
}

impl ListingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_area(dir: &Path, area_code: u32) -> Self {
        Self::new(dir.join(format!("listings{}.json", area_code)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previously saved listings. A missing or unreadable cache is an empty one.
    pub async fn load(&self) -> Vec<Listing> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No cache at {}, starting fresh", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read cache {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Listing>>(&raw) {
            Ok(listings) => {
                info!("Loaded {} cached listings from {}", listings.len(), self.path.display());
                listings
            }
            Err(e) => {
                warn!("Ignoring corrupt cache {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub async fn save(&self, listings: &[Listing]) -> Result<()> {
        let json = serde_json::to_string_pretty(listings)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write cache {}", self.path.display()))?;
        info!("💾 Saved {} listings to {}", listings.len(), self.path.display());
        Ok(())
    }
}

pub fn seen_urls(listings: &[Listing]) -> HashSet<String> {
    listings.iter().map(|l| l.url.clone()).collect()
}
