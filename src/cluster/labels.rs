//! Policy label synthesis for clusters

use crate::cluster::{Clusters, CommunityId};
use crate::error::{AnalyzerError, Result};
use crate::graph::{ServerGraph, ServerNode};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maximum number of applications named in a cluster label
pub const MAX_LABEL_APPS: usize = 3;

/// A singleton cluster whose only server hosts a single application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsolatedServer {
    pub server: String,
    pub label: String,
}

/// Labels produced for one clustering.
///
/// Cluster-labeled servers and isolated servers are kept disjoint; together
/// they cover every clustered server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    cluster_labels: BTreeMap<String, String>,
    by_cluster: BTreeMap<CommunityId, String>,
    isolated: Vec<IsolatedServer>,
}

impl LabelSet {
    /// Label of every non-isolated server
    pub fn cluster_labels(&self) -> &BTreeMap<String, String> {
        &self.cluster_labels
    }

    /// Label shared by the members of a non-isolated cluster
    pub fn cluster_label(&self, community: CommunityId) -> Option<&str> {
        self.by_cluster.get(&community).map(String::as_str)
    }

    /// Isolated servers in cluster order
    pub fn isolated(&self) -> &[IsolatedServer] {
        &self.isolated
    }

    pub fn isolated_servers(&self) -> Vec<&str> {
        self.isolated.iter().map(|entry| entry.server.as_str()).collect()
    }

    pub fn is_isolated(&self, server: &str) -> bool {
        self.isolated.iter().any(|entry| entry.server == server)
    }

    pub fn label_for(&self, server: &str) -> Option<&str> {
        self.cluster_labels
            .get(server)
            .map(String::as_str)
            .or_else(|| {
                self.isolated
                    .iter()
                    .find(|entry| entry.server == server)
                    .map(|entry| entry.label.as_str())
            })
    }

    /// Every server's label, isolated servers included
    pub fn all_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.cluster_labels.clone();
        for entry in &self.isolated {
            labels.insert(entry.server.clone(), entry.label.clone());
        }
        labels
    }

    /// Number of labeled servers
    pub fn len(&self) -> usize {
        self.cluster_labels.len() + self.isolated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive a policy label for every clustered server.
///
/// Clusters are processed in ascending community order. A singleton whose
/// server hosts exactly one application `X` is isolated with label `APP_X`.
/// Every other cluster is labeled `CLUSTER_<id>_<apps>` from its common
/// applications, or from its most frequent ones when nothing is shared.
pub fn synthesize_labels(graph: &ServerGraph, clusters: &Clusters) -> Result<LabelSet> {
    log::info!("Creating labels for {} clusters", clusters.len());

    let mut labels = LabelSet::default();

    for (community, members) in clusters.iter() {
        if members.is_empty() {
            return Err(AnalyzerError::InvariantViolation(format!(
                "cluster {} has no members",
                community
            )));
        }

        let nodes = members
            .iter()
            .map(|server| {
                graph.node(server).ok_or_else(|| {
                    AnalyzerError::InvariantViolation(format!(
                        "cluster {} references unknown server {}",
                        community, server
                    ))
                })
            })
            .collect::<Result<Vec<&ServerNode>>>()?;

        if let [node] = nodes.as_slice() {
            if let [app] = node.apps.as_slice() {
                labels.isolated.push(IsolatedServer {
                    server: node.id.clone(),
                    label: format!("APP_{}", app),
                });
                continue;
            }
        }

        let label = cluster_label(community, &nodes);
        for node in &nodes {
            labels.cluster_labels.insert(node.id.clone(), label.clone());
        }
        labels.by_cluster.insert(community, label);
    }

    log::info!(
        "Labeled {} servers ({} isolated)",
        labels.len(),
        labels.isolated.len()
    );

    Ok(labels)
}

/// `CLUSTER_<id>_<apps>` for a cluster that is not isolated
pub fn cluster_label(community: CommunityId, nodes: &[&ServerNode]) -> String {
    let common = common_apps(nodes);

    let selected: Vec<&str> = if common.is_empty() {
        // Frequency order is kept as is; only the common branch is sorted
        top_apps_by_frequency(nodes, MAX_LABEL_APPS)
    } else {
        common.into_iter().sorted().take(MAX_LABEL_APPS).collect()
    };

    format!("CLUSTER_{}_{}", community, selected.iter().join("_"))
}

/// Applications hosted by every node
pub fn common_apps<'a>(nodes: &[&'a ServerNode]) -> Vec<&'a str> {
    let Some((first, rest)) = nodes.split_first() else {
        return Vec::new();
    };

    let others: Vec<HashSet<&str>> = rest.iter().map(|node| node.app_set()).collect();
    first
        .apps
        .iter()
        .map(String::as_str)
        .filter(|app| others.iter().all(|set| set.contains(app)))
        .collect()
}

/// Up to `limit` applications by descending number of hosting nodes.
///
/// Equal counts keep first-seen order (members in cluster order, each
/// member's applications in listed order).
pub fn top_apps_by_frequency<'a>(nodes: &[&'a ServerNode], limit: usize) -> Vec<&'a str> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for node in nodes {
        for app in &node.apps {
            let count = counts.entry(app.as_str()).or_insert_with(|| {
                order.push(app.as_str());
                0
            });
            *count += 1;
        }
    }

    order
        .into_iter()
        .map(|app| (app, counts[app]))
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(limit)
        .map(|(app, _)| app)
        .collect()
}
