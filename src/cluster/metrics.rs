//! Cluster statistics and metrics

use crate::cluster::{Clusters, CommunityId};
use crate::error::{AnalyzerError, Result};
use crate::graph::ServerGraph;
use serde::Serialize;
use std::collections::HashSet;

/// Summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStatistic {
    pub cluster_id: CommunityId,

    /// Number of member servers
    pub num_servers: usize,

    /// Distinct applications across all members
    pub num_unique_apps: usize,

    /// Mean application count per member
    pub avg_apps_per_server: f64,
}

/// Compute statistics for every cluster, largest first.
///
/// Clusters of equal size keep ascending community order.
pub fn analyze_clusters(graph: &ServerGraph, clusters: &Clusters) -> Result<Vec<ClusterStatistic>> {
    log::info!("Analyzing statistics for {} clusters", clusters.len());

    let mut stats = clusters
        .iter()
        .map(|(community, members)| calculate_cluster_statistic(graph, community, members))
        .collect::<Result<Vec<_>>>()?;

    stats.sort_by(|a, b| b.num_servers.cmp(&a.num_servers));

    if let Some(largest) = stats.first() {
        log::debug!(
            "Largest cluster {} has {} servers",
            largest.cluster_id,
            largest.num_servers
        );
    }

    Ok(stats)
}

/// Calculate the statistic of a single cluster
pub fn calculate_cluster_statistic(
    graph: &ServerGraph,
    community: CommunityId,
    members: &[String],
) -> Result<ClusterStatistic> {
    if members.is_empty() {
        return Err(AnalyzerError::InvariantViolation(format!(
            "cluster {} has no members",
            community
        )));
    }

    let mut unique_apps: HashSet<&str> = HashSet::new();
    let mut total_apps = 0usize;

    for server in members {
        let apps = graph.apps(server).ok_or_else(|| {
            AnalyzerError::InvariantViolation(format!(
                "cluster {} references unknown server {}",
                community, server
            ))
        })?;
        total_apps += apps.len();
        unique_apps.extend(apps.iter().map(String::as_str));
    }

    Ok(ClusterStatistic {
        cluster_id: community,
        num_servers: members.len(),
        num_unique_apps: unique_apps.len(),
        avg_apps_per_server: total_apps as f64 / members.len() as f64,
    })
}
