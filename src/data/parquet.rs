//! Parquet file handling for server inventory data

use crate::data::ServerRecord;
use crate::error::{AnalyzerError, Result};
use polars::prelude::*;
use std::collections::HashMap;

/// Load server/application pairs stored in long format (one row per pair).
///
/// The file must contain string columns `server` and `app`. A row with a null
/// `app` declares a server that hosts nothing. Servers are returned in the
/// order in which they first appear.
pub fn load_server_apps(path: &str) -> Result<Vec<ServerRecord>> {
    log::info!("Reading parquet file: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(AnalyzerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path),
        )));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;

    log::debug!("File schema: {:?}", df.schema());
    log::info!("Loaded {} server/application rows", df.height());

    let server_col = df.column("server")?.str()?;
    let app_col = df.column("app")?.str()?;

    let mut index_by_server: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<ServerRecord> = Vec::new();

    for row in 0..df.height() {
        let server = server_col.get(row).ok_or_else(|| AnalyzerError::MalformedRecord {
            index: row,
            reason: "null server identifier".to_string(),
        })?;

        let idx = *index_by_server.entry(server.to_string()).or_insert_with(|| {
            records.push(ServerRecord::new(server, Vec::<String>::new()));
            records.len() - 1
        });

        if let Some(app) = app_col.get(row) {
            records[idx].apps.push(app.to_string());
        }
    }

    log::info!("Grouped rows into {} servers", records.len());
    Ok(records)
}
