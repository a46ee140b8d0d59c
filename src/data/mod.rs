//! Server record loading and preparation

pub mod parquet;
pub mod preprocessing;
pub mod records;

pub use records::ServerRecord;

use crate::error::Result;
use std::path::Path;

/// Load server records from a `.json` or `.parquet` file and normalise them
pub fn load_records(path: &str) -> Result<Vec<ServerRecord>> {
    let is_parquet = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    let records = if is_parquet {
        parquet::load_server_apps(path)?
    } else {
        records::load_json_records(path)?
    };

    preprocessing::normalize_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn parquet_input_is_normalised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.parquet");
        let mut df = df!(
            "server" => ["web1", "web1", "web1", "db1"],
            "app" => [Some(" nginx"), Some("nginx"), Some(""), None]
        )
        .unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let records = load_records(path.to_str().unwrap()).unwrap();

        assert_eq!(
            records,
            vec![
                ServerRecord::new("web1", ["nginx"]),
                ServerRecord::new("db1", Vec::<String>::new()),
            ]
        );
    }
}
