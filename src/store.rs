//! The published catalog files.
//!
//! Existing entries are carried as raw JSON objects so a rewrite keeps every
//! field the producer or a curator put there, exactly as written.

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::constants::JS_GLOBAL;
use crate::error::{CatalogError, Result};
use crate::types::Catalog;

/// One catalog entry as stored on disk.
pub type StoredRecord = Value;

fn record_id(record: &StoredRecord) -> Option<&str> {
    record.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

/// Reads the published catalog, or an empty one if it has not been written yet.
pub async fn load_existing(path: &Path) -> Result<Vec<StoredRecord>> {
    if !fs::try_exists(path).await? {
        debug!(path = %path.display(), "No existing catalog");
        return Ok(Vec::new());
    }
    let body = fs::read(path).await?;
    match serde_json::from_slice(&body)? {
        Value::Array(records) => Ok(records),
        _ => Err(CatalogError::Shape(format!("{} does not hold a JSON array", path.display()))),
    }
}

/// New records first, then existing records whose id is not among the new ones.
pub fn merge(new: Catalog, existing: Vec<StoredRecord>) -> Result<Vec<StoredRecord>> {
    let new_ids: HashSet<String> = new
        .iter()
        .filter(|r| !r.id.is_empty())
        .map(|r| r.id.clone())
        .collect();

    let mut combined = new
        .into_iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    combined.extend(
        existing
            .into_iter()
            .filter(|r| record_id(r).map_or(true, |id| !new_ids.contains(id))),
    );
    Ok(combined)
}

/// Keeps the first record for each id, preserving order. Records without an
/// id are all kept.
pub fn dedupe_by_id(records: Vec<StoredRecord>) -> Vec<StoredRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| match record_id(r) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

/// JS file that assigns the catalog to the page-wide global.
pub fn render_js_literal(records: &[StoredRecord]) -> Result<String> {
    let json = serde_json::to_string_pretty(records)?;
    Ok(format!("{JS_GLOBAL} = {json};\n"))
}

/// Writes the catalog as JSON and as a JS literal, deduplicating first.
/// Returns the number of records written.
#[instrument(skip_all, fields(json = %json_path.display(), js = %js_path.display()))]
pub async fn save(records: Vec<StoredRecord>, json_path: &Path, js_path: &Path) -> Result<usize> {
    let unique = dedupe_by_id(records);

    for path in [json_path, js_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(json_path, serde_json::to_string_pretty(&unique)?).await?;
    fs::write(js_path, render_js_literal(&unique)?).await?;

    info!("Saved {} problem records", unique.len());
    Ok(unique.len())
}
