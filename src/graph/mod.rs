//! Server co-occurrence graph representation and algorithms

pub mod algorithms;
pub mod builder;
pub mod compressed;

pub use builder::GraphBuilder;
pub use compressed::CompressedGraph;

use crate::data::ServerRecord;
use crate::error::{AnalyzerError, Result};
use itertools::Itertools;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// A server node annotated with its application set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerNode {
    /// Server identifier
    pub id: String,

    /// Distinct applications, in the order they were first listed
    pub apps: Vec<String>,
}

impl ServerNode {
    pub fn new(id: &str, apps: &[String]) -> Self {
        Self {
            id: id.to_string(),
            apps: apps.iter().unique().cloned().collect(),
        }
    }

    pub fn app_set(&self) -> HashSet<&str> {
        self.apps.iter().map(String::as_str).collect()
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }
}

/// Weighted undirected graph of servers where an edge carries the number of
/// applications its endpoints share.
///
/// Nodes keep their insertion order, which is also the discovery order used
/// when grouping a partition into clusters.
#[derive(Debug, Clone, Default)]
pub struct ServerGraph {
    graph: UnGraph<ServerNode, u32>,
    index_by_id: HashMap<String, NodeIndex>,
}

impl ServerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            index_by_id: HashMap::with_capacity(nodes),
        }
    }

    /// Add a server node, rejecting identifiers already present
    pub fn add_server(&mut self, record: &ServerRecord) -> Result<NodeIndex> {
        if self.index_by_id.contains_key(&record.server) {
            return Err(AnalyzerError::DuplicateServer(record.server.clone()));
        }

        let idx = self.graph.add_node(ServerNode::new(&record.server, &record.apps));
        self.index_by_id.insert(record.server.clone(), idx);
        Ok(idx)
    }

    /// Add an edge between two nodes by position. Only the builder calls this,
    /// with `a != b`, `weight > 0` and each pair at most once.
    pub(crate) fn add_weighted_edge(&mut self, a: usize, b: usize, weight: u32) {
        debug_assert!(a != b && weight > 0);
        self.graph
            .add_edge(NodeIndex::new(a), NodeIndex::new(b), weight);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, server: &str) -> bool {
        self.index_by_id.contains_key(server)
    }

    /// Position of a server in insertion order
    pub fn index_of(&self, server: &str) -> Option<usize> {
        self.index_by_id.get(server).map(|idx| idx.index())
    }

    pub fn node(&self, server: &str) -> Option<&ServerNode> {
        self.index_by_id
            .get(server)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn apps(&self, server: &str) -> Option<&[String]> {
        self.node(server).map(|node| node.apps.as_slice())
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ServerNode> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    pub fn server_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes().map(|node| node.id.as_str())
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = *self.index_by_id.get(a)?;
        let b = *self.index_by_id.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Edges as `(server, server, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u32)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
                *edge.weight(),
            )
        })
    }

    /// Edges as `(position, position, weight)`
    pub fn indexed_edges(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index(), *edge.weight()))
    }

    pub fn degree(&self, server: &str) -> usize {
        self.index_by_id
            .get(server)
            .map_or(0, |&idx| self.graph.neighbors(idx).count())
    }
}
