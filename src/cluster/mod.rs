//! Cluster analysis module
//!
//! A [`Partition`] maps every server to an opaque [`CommunityId`]; [`Clusters`]
//! is its inverse grouping, validated against the graph it was computed on.

pub mod detection;
pub mod labels;
pub mod metrics;

pub use detection::{CommunityOracle, ConnectedComponents, Louvain};
pub use labels::{synthesize_labels, IsolatedServer, LabelSet};
pub use metrics::{analyze_clusters, ClusterStatistic};

use crate::error::{AnalyzerError, Result};
use crate::graph::{algorithms, CompressedGraph, ServerGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of a community produced by a community oracle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommunityId(pub u32);

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Assignment of servers to communities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    assignments: HashMap<String, CommunityId>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, server: impl Into<String>, community: CommunityId) {
        self.assignments.insert(server.into(), community);
    }

    pub fn community_of(&self, server: &str) -> Option<CommunityId> {
        self.assignments.get(server).copied()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CommunityId)> + '_ {
        self.assignments.iter().map(|(server, &id)| (server.as_str(), id))
    }

    /// Build from per-node community numbers given in graph insertion order
    pub fn from_node_communities(graph: &ServerGraph, communities: &[usize]) -> Self {
        graph
            .server_ids()
            .zip(communities)
            .map(|(server, &community)| (server, community as u32))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Partition {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            assignments: iter
                .into_iter()
                .map(|(server, id)| (server.into(), CommunityId(id)))
                .collect(),
        }
    }
}

/// Servers grouped by community, communities in ascending id order and
/// members in graph discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Clusters {
    groups: BTreeMap<CommunityId, Vec<String>>,
}

impl Clusters {
    /// Invert a partition over the graph's nodes.
    ///
    /// Fails when the partition misses a graph node or names an unknown one.
    pub fn from_partition(graph: &ServerGraph, partition: &Partition) -> Result<Self> {
        if let Some(unknown) = partition
            .iter()
            .map(|(server, _)| server)
            .filter(|server| !graph.contains(server))
            .min()
        {
            return Err(AnalyzerError::InvariantViolation(format!(
                "partition references unknown server {}",
                unknown
            )));
        }

        let mut groups: BTreeMap<CommunityId, Vec<String>> = BTreeMap::new();
        for server in graph.server_ids() {
            let community = partition.community_of(server).ok_or_else(|| {
                AnalyzerError::InvariantViolation(format!(
                    "server {} has no community",
                    server
                ))
            })?;
            groups.entry(community).or_default().push(server.to_string());
        }

        log::debug!("Grouped {} servers into {} clusters", graph.node_count(), groups.len());
        Ok(Self { groups })
    }

    /// Wrap an existing grouping without checking it against a graph
    pub fn from_groups(groups: BTreeMap<CommunityId, Vec<String>>) -> Self {
        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CommunityId, &[String])> + '_ {
        self.groups
            .iter()
            .map(|(&id, members)| (id, members.as_slice()))
    }

    pub fn members(&self, community: CommunityId) -> Option<&[String]> {
        self.groups.get(&community).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn server_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Modularity of the clustering over the weighted server graph
pub fn partition_modularity(graph: &ServerGraph, clusters: &Clusters, resolution: f64) -> f64 {
    let mut communities = vec![0usize; graph.node_count()];
    for (slot, (_, members)) in clusters.iter().enumerate() {
        for server in members {
            if let Some(idx) = graph.index_of(server) {
                communities[idx] = slot;
            }
        }
    }

    algorithms::modularity(&CompressedGraph::from_server_graph(graph), &communities, resolution)
}
