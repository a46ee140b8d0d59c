//! Weighted compressed adjacency used by the community oracles

use crate::graph::ServerGraph;
use std::mem;

/// Compressed sparse representation of a weighted undirected graph.
///
/// Every edge is stored in both endpoints' ranges. Self-loop weights are kept
/// apart so aggregated Louvain levels can carry intra-community weight.
#[derive(Debug, Clone)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] defines the edge range for node i
    pub offsets: Vec<u32>,

    /// Concatenated neighbour lists, sorted within each range
    pub edges: Vec<u32>,

    /// Weight of each entry in `edges`
    pub weights: Vec<f64>,

    /// Self-loop weight per node
    pub self_loops: Vec<f64>,
}

impl CompressedGraph {
    /// Build from undirected edges `(a, b, weight)` with `a != b`
    pub fn from_weighted_edges(
        node_count: usize,
        edges: &[(usize, usize, f64)],
        self_loops: Vec<f64>,
    ) -> Self {
        let mut adjacency_lists: Vec<Vec<(u32, f64)>> = vec![Vec::new(); node_count];
        for &(a, b, weight) in edges {
            adjacency_lists[a].push((b as u32, weight));
            adjacency_lists[b].push((a as u32, weight));
        }

        let edge_count: usize = adjacency_lists.iter().map(|list| list.len()).sum();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::with_capacity(edge_count);
        let mut weights = Vec::with_capacity(edge_count);

        offsets.push(0);
        let mut offset = 0;
        for list in &mut adjacency_lists {
            list.sort_unstable_by_key(|&(target, _)| target);
            offset += list.len() as u32;
            offsets.push(offset);
            for &(target, weight) in list.iter() {
                targets.push(target);
                weights.push(weight);
            }
        }

        let mut self_loops = self_loops;
        self_loops.resize(node_count, 0.0);

        Self {
            node_count,
            offsets,
            edges: targets,
            weights,
            self_loops,
        }
    }

    /// Build from the server graph, node positions following insertion order
    pub fn from_server_graph(graph: &ServerGraph) -> Self {
        let edges: Vec<(usize, usize, f64)> = graph
            .indexed_edges()
            .map(|(a, b, weight)| (a, b, weight as f64))
            .collect();

        Self::from_weighted_edges(graph.node_count(), &edges, vec![0.0; graph.node_count()])
    }

    /// Get neighbours of a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get weights aligned with `outgoing_edges`
    pub fn edge_weights(&self, node: usize) -> &[f64] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.outgoing_edges(node)
            .iter()
            .zip(self.edge_weights(node))
            .map(|(&target, &weight)| (target as usize, weight))
    }

    /// Sum of incident weights, self-loops counted twice
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.edge_weights(node).iter().sum::<f64>() + 2.0 * self.self_loops[node]
    }

    /// Total edge weight, each undirected edge and self-loop counted once
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum::<f64>() / 2.0 + self.self_loops.iter().sum::<f64>()
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>()
            + self.offsets.capacity() * mem::size_of::<u32>()
            + self.edges.capacity() * mem::size_of::<u32>()
            + self.weights.capacity() * mem::size_of::<f64>()
            + self.self_loops.capacity() * mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_both_directions_sorted() {
        let graph = CompressedGraph::from_weighted_edges(
            3,
            &[(2, 0, 1.0), (0, 1, 2.0)],
            vec![0.0, 0.0, 0.5],
        );

        assert_eq!(graph.outgoing_edges(0), &[1, 2]);
        assert_eq!(graph.edge_weights(0), &[2.0, 1.0]);
        assert_eq!(graph.outgoing_edges(2), &[0]);
        assert_eq!(graph.outgoing_edges(1), &[0]);
        assert_eq!(graph.weighted_degree(2), 2.0);
        assert_eq!(graph.total_weight(), 3.5);
    }
}
