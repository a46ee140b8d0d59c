//! Record normalisation before graph construction

use crate::data::ServerRecord;
use crate::error::{AnalyzerError, Result};
use std::collections::HashSet;

/// Trim identifiers, drop blank application names and de-duplicate each
/// application list, keeping the first occurrence of every application
pub fn normalize_records(records: Vec<ServerRecord>) -> Result<Vec<ServerRecord>> {
    let mut normalized = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let server = record.server.trim();
        if server.is_empty() {
            return Err(AnalyzerError::MalformedRecord {
                index,
                reason: "empty server identifier".to_string(),
            });
        }

        normalized.push(ServerRecord {
            server: server.to_string(),
            apps: dedup_apps(&record.apps),
        });
    }

    let without_apps = normalized.iter().filter(|r| r.apps.is_empty()).count();
    if without_apps > 0 {
        log::warn!("{} servers have no applications and will stay isolated", without_apps);
    }

    Ok(normalized)
}

/// De-duplicate application identifiers preserving first-seen order
pub fn dedup_apps(apps: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(apps.len());
    apps.iter()
        .map(|app| app.trim())
        .filter(|app| !app.is_empty())
        .filter(|app| seen.insert(app.to_string()))
        .map(str::to_string)
        .collect()
}
