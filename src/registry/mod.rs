//! Registry and list-file I/O
//!
//! The registry (`profiles.json`) is owned by the interactive editor; this
//! module reads it, lets the enricher fill empty fields, and writes it back
//! with an atomic whole-file rewrite. Unrecognized profile fields are
//! preserved verbatim so externally-authored files round-trip.
//!
//! For the diff path a missing or malformed registry degrades to an empty
//! registered set with a warning; only the enrichment path, which must
//! write the file back, treats absence as fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::crawler::url::extract_item_id;
use crate::error::{Error, Result};
use crate::models::{Catalog, DiffResult};

/// One curated registry entry
///
/// Only the fields the pipeline touches are named; everything else the
/// editor maintains (dates, authorship, support flags) rides in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "avatarName", default)]
    pub avatar_name: String,

    /// Primary listing URL; contributes to the registered set and is the
    /// source page for the avatar shop name and price
    #[serde(rename = "avatarNameUrl", default)]
    pub avatar_name_url: String,

    /// Distribution location URL; contributes to the registered set and is
    /// the source page for the profile shop name
    #[serde(rename = "downloadLocation", default)]
    pub download_location: String,

    #[serde(rename = "avatarPrice", default, skip_serializing_if = "String::is_empty")]
    pub avatar_price: String,

    #[serde(rename = "avatarshopname", default, skip_serializing_if = "String::is_empty")]
    pub avatar_shop_name: String,

    #[serde(rename = "profileshopname", default, skip_serializing_if = "String::is_empty")]
    pub profile_shop_name: String,

    /// Editor-owned fields we do not interpret, preserved on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The registry document: a `profiles` array plus whatever else the file
/// carries at top level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Registry {
    /// Load the registry, failing when the file is missing or malformed
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` / `Error::Json` on read or parse failure
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rewrite the registry atomically (temp file + rename, same directory)
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` / `Error::Json` on serialization or write failure
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = dir.join(format!(
            ".{}.tmp",
            path.file_name()
                .map_or_else(|| "registry".to_string(), |n| n.to_string_lossy().into_owned())
        ));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Item IDs registered through either URL-bearing field
    #[must_use]
    pub fn registered_ids(&self) -> HashSet<String> {
        let mut ids = HashSet::new();
        for profile in &self.profiles {
            for url in [&profile.avatar_name_url, &profile.download_location] {
                if let Some(id) = extract_item_id(url) {
                    ids.insert(id);
                }
            }
        }
        ids
    }
}

/// Load the registered-ID set, degrading to empty on any problem
///
/// The diff path tolerates a missing or unparsable registry: blocking the
/// whole reconciliation over it would hide the catalog side entirely.
#[must_use]
pub fn load_registered_ids(path: &Path) -> HashSet<String> {
    match Registry::load(path) {
        Ok(registry) => registry.registered_ids(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Registry unavailable, using empty registered set");
            HashSet::new()
        }
    }
}

/// Load a blocklist file: one URL per line, `#` comments and blanks ignored
///
/// An absent file yields an empty set; blocking is optional.
#[must_use]
pub fn load_blocklist(path: &Path) -> HashSet<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        tracing::debug!(path = %path.display(), "Blocklist not found, using empty set");
        return HashSet::new();
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(extract_item_id)
        .collect()
}

/// Load a pre-materialized catalog from a URL-list file
///
/// The catalog source is required input: a missing file is a configuration
/// error, unlike the tolerant registry/blocklist loaders.
///
/// # Errors
///
/// Returns `Error::Config` when the file cannot be read
pub fn load_url_list(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("cannot read catalog file {}: {e}", path.display()))
    })?;

    let mut catalog = Catalog::new();
    for line in content.lines() {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if let Some(item_id) = extract_item_id(url) {
            catalog.insert(item_id, url);
        }
    }
    Ok(catalog)
}

/// Write the forward-diff report: one canonical URL per line in shop order
///
/// # Errors
///
/// Returns `Error::Io` on write failure
pub fn write_report(path: &Path, diff: &DiffResult) -> Result<()> {
    let mut out = String::new();
    for (_, url) in &diff.forward {
        out.push_str(url);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Write a collected catalog as a sorted URL list, one per line
///
/// # Errors
///
/// Returns `Error::Io` on write failure
pub fn write_url_list(path: &Path, catalog: &Catalog) -> Result<()> {
    let mut urls: Vec<&str> = catalog.items().iter().map(|i| i.url.as_str()).collect();
    urls.sort_unstable();

    let mut out = String::new();
    for url in urls {
        out.push_str(url);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}
