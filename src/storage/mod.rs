//! Results persistence module

use crate::cluster::ClusterStatistic;
use crate::error::Result;
use crate::pipeline::AnalysisOutcome;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Memberships, labels and isolated servers
pub const RESULTS_FILE: &str = "server_clusters_results.json";
/// Per-cluster statistics
pub const STATISTICS_FILE: &str = "cluster_statistics.csv";
/// Run summary
pub const SUMMARY_FILE: &str = "summary.json";

/// Save analysis results to the specified directory
pub fn save_results(outcome: &AnalysisOutcome, output_dir: &str) -> Result<()> {
    log::info!(
        "Saving {} clusters to {}",
        outcome.clusters.len(),
        output_dir
    );

    fs::create_dir_all(output_dir)?;

    save_cluster_results(outcome, output_dir)?;
    save_statistics(&outcome.statistics, output_dir)?;
    save_summary(outcome, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save cluster membership, every server's label and the isolated servers
fn save_cluster_results(outcome: &AnalysisOutcome, output_dir: &str) -> Result<()> {
    log::info!("Saving cluster memberships and labels");

    let path = Path::new(output_dir).join(RESULTS_FILE);
    let mut file = File::create(path)?;

    let results = json!({
        "clusters": outcome.clusters,
        "labels": outcome.labels.all_labels(),
        "isolated_servers": outcome.labels.isolated_servers(),
    });

    file.write_all(to_string_pretty(&results)?.as_bytes())?;

    Ok(())
}

/// Save cluster statistics as CSV, in their sorted order
fn save_statistics(statistics: &[ClusterStatistic], output_dir: &str) -> Result<()> {
    log::info!("Saving statistics for {} clusters", statistics.len());

    let path = Path::new(output_dir).join(STATISTICS_FILE);
    let mut file = File::create(path)?;

    writeln!(file, "cluster_id,num_servers,num_unique_apps,avg_apps_per_server")?;
    for stat in statistics {
        writeln!(
            file,
            "{},{},{},{}",
            stat.cluster_id, stat.num_servers, stat.num_unique_apps, stat.avg_apps_per_server
        )?;
    }

    Ok(())
}

/// Save summary information
fn save_summary(outcome: &AnalysisOutcome, output_dir: &str) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join(SUMMARY_FILE);
    let mut file = File::create(path)?;

    let server_count = outcome.graph.node_count();
    let summary = json!({
        "graph_stats": {
            "server_count": server_count,
            "edge_count": outcome.graph.edge_count(),
            "total_edge_weight": outcome.graph.edges().map(|(_, _, w)| w as u64).sum::<u64>(),
        },
        "cluster_stats": {
            "algorithm": outcome.oracle,
            "cluster_count": outcome.clusters.len(),
            "isolated_count": outcome.labels.isolated().len(),
            "largest_cluster_size": outcome.statistics.first().map_or(0, |s| s.num_servers),
            "avg_cluster_size": server_count as f64 /
                                if outcome.clusters.is_empty() { 1.0 } else { outcome.clusters.len() as f64 },
            "modularity": outcome.modularity,
        }
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::CommunityOracle;
    use crate::cluster::Partition;
    use crate::config::Config;
    use crate::data::ServerRecord;
    use crate::graph::ServerGraph;
    use crate::pipeline::analyze;
    use tempfile::TempDir;

    struct Fixed;

    impl CommunityOracle for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn detect(&self, _graph: &ServerGraph) -> Result<Partition> {
            Ok([("A", 0), ("B", 0), ("C", 1)].into_iter().collect())
        }
    }

    fn outcome() -> AnalysisOutcome {
        let records = vec![
            ServerRecord::new("A", ["web", "db"]),
            ServerRecord::new("B", ["web", "db"]),
            ServerRecord::new("C", ["cache"]),
        ];
        analyze(&records, &Fixed, &Config::default()).unwrap()
    }

    #[test]
    fn writes_results_json() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().to_str().unwrap();
        save_results(&outcome(), output).unwrap();

        let text = fs::read_to_string(dir.path().join(RESULTS_FILE)).unwrap();
        let results: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(results["clusters"]["0"], json!(["A", "B"]));
        assert_eq!(results["clusters"]["1"], json!(["C"]));
        assert_eq!(results["labels"]["A"], json!("CLUSTER_0_db_web"));
        assert_eq!(results["labels"]["C"], json!("APP_cache"));
        assert_eq!(results["isolated_servers"], json!(["C"]));
    }

    #[test]
    fn writes_statistics_csv() {
        let dir = TempDir::new().unwrap();
        save_results(&outcome(), dir.path().to_str().unwrap()).unwrap();

        let csv = fs::read_to_string(dir.path().join(STATISTICS_FILE)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "cluster_id,num_servers,num_unique_apps,avg_apps_per_server",
                "0,2,2,2",
                "1,1,1,1",
            ]
        );
    }

    #[test]
    fn writes_summary_for_empty_run() {
        let dir = TempDir::new().unwrap();
        save_results(&AnalysisOutcome::empty(), dir.path().to_str().unwrap()).unwrap();

        let text = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["graph_stats"]["server_count"], json!(0));
        assert_eq!(summary["cluster_stats"]["cluster_count"], json!(0));
        assert_eq!(summary["cluster_stats"]["algorithm"], json!(null));
    }
}
