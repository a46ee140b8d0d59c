//! Server records and their JSON representation

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

/// One server and the applications it hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Unique server identifier
    pub server: String,

    /// Hosted application identifiers (order irrelevant)
    pub apps: Vec<String>,
}

impl ServerRecord {
    pub fn new<S, I, A>(server: S, apps: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            server: server.into(),
            apps: apps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Load records from a JSON file holding a list of `{"server", "apps"}` objects
pub fn load_json_records(path: &str) -> Result<Vec<ServerRecord>> {
    log::info!("Reading JSON file: {}", path);

    let file = File::open(path)?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    let records = records_from_value(value)?;

    log::info!("Loaded {} server records", records.len());
    Ok(records)
}

/// Parse records from a JSON string
pub fn parse_json_records(json: &str) -> Result<Vec<ServerRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    records_from_value(value)
}

fn records_from_value(value: serde_json::Value) -> Result<Vec<ServerRecord>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(AnalyzerError::MalformedRecord {
                index: 0,
                reason: "expected a list of servers".to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ServerRecord>(item).map_err(|e| {
                AnalyzerError::MalformedRecord {
                    index,
                    reason: format!("each entry needs 'server' and 'apps': {}", e),
                }
            })
        })
        .collect()
}
