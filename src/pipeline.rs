//! End-to-end analysis: records → graph → partition → labels and statistics

use crate::cluster::detection::oracle_from_config;
use crate::cluster::{
    analyze_clusters, partition_modularity, synthesize_labels, ClusterStatistic, Clusters,
    CommunityOracle, LabelSet, Partition,
};
use crate::config::Config;
use crate::data::ServerRecord;
use crate::error::Result;
use crate::graph::{GraphBuilder, ServerGraph};

/// Everything produced by one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub graph: ServerGraph,
    pub partition: Partition,
    pub clusters: Clusters,
    pub labels: LabelSet,
    pub statistics: Vec<ClusterStatistic>,

    /// Modularity of the clustering (0.0 for an empty run)
    pub modularity: f64,

    /// Name of the oracle that produced the partition, if one ran
    pub oracle: Option<&'static str>,
}

impl AnalysisOutcome {
    /// Result of a run over zero servers
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// Run the analysis with the oracle selected in `config`
pub fn run(records: &[ServerRecord], config: &Config) -> Result<AnalysisOutcome> {
    let oracle = oracle_from_config(config);
    analyze(records, oracle.as_ref(), config)
}

/// Run the analysis with an explicit community oracle.
///
/// Zero records short-circuit to [`AnalysisOutcome::empty`] without invoking
/// the oracle.
pub fn analyze(
    records: &[ServerRecord],
    oracle: &dyn CommunityOracle,
    config: &Config,
) -> Result<AnalysisOutcome> {
    if records.is_empty() {
        log::warn!("No servers supplied, skipping community detection");
        return Ok(AnalysisOutcome::empty());
    }

    let graph = GraphBuilder::from_config(config).build(records)?;

    log::info!("Running community detection: {}", oracle.name());
    let partition = oracle.detect(&graph)?;
    let clusters = Clusters::from_partition(&graph, &partition)?;
    log::info!("Found {} clusters", clusters.len());

    let labels = synthesize_labels(&graph, &clusters)?;
    let statistics = analyze_clusters(&graph, &clusters)?;
    let modularity = partition_modularity(&graph, &clusters, config.resolution);

    log::info!(
        "Analysis complete: {} servers, {} clusters, {} isolated, modularity {:.4}",
        graph.node_count(),
        clusters.len(),
        labels.isolated().len(),
        modularity
    );

    Ok(AnalysisOutcome {
        graph,
        partition,
        clusters,
        labels,
        statistics,
        modularity,
        oracle: Some(oracle.name()),
    })
}
