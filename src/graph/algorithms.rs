//! Graph algorithms for analysis

use crate::graph::CompressedGraph;

/// Weighted degree of every node
pub fn weighted_degrees(graph: &CompressedGraph) -> Vec<f64> {
    (0..graph.node_count)
        .map(|node| graph.weighted_degree(node))
        .collect()
}

/// Modularity of a node→community assignment with resolution `gamma`:
/// the sum over communities of `in_c / m - gamma * (tot_c / 2m)^2`.
///
/// Returns 0.0 for a graph without any weight.
pub fn modularity(graph: &CompressedGraph, communities: &[usize], gamma: f64) -> f64 {
    let m = graph.total_weight();
    if m == 0.0 {
        return 0.0;
    }

    let slots = communities.iter().copied().max().map_or(0, |max| max + 1);
    let mut internal = vec![0.0; slots];
    let mut totals = vec![0.0; slots];

    for node in 0..graph.node_count {
        let community = communities[node];
        totals[community] += graph.weighted_degree(node);
        internal[community] += graph.self_loops[node];

        for (neighbor, weight) in graph.neighbors(node) {
            if node < neighbor && communities[neighbor] == community {
                internal[community] += weight;
            }
        }
    }

    internal
        .iter()
        .zip(&totals)
        .map(|(&inside, &total)| inside / m - gamma * (total / (2.0 * m)).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangles() -> CompressedGraph {
        CompressedGraph::from_weighted_edges(
            6,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (0, 2, 1.0),
                (3, 4, 1.0),
                (4, 5, 1.0),
                (3, 5, 1.0),
                (2, 3, 1.0),
            ],
            vec![0.0; 6],
        )
    }

    #[test]
    fn single_community_has_zero_modularity() {
        let graph = two_triangles();
        assert_relative_eq!(modularity(&graph, &[0; 6], 1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn split_triangles_beats_merged() {
        let graph = two_triangles();
        let split = modularity(&graph, &[0, 0, 0, 1, 1, 1], 1.0);
        // 2 * (3/7 - (7/14)^2)
        assert_relative_eq!(split, 2.0 * (3.0 / 7.0 - 0.25), epsilon = 1e-12);
        assert!(split > modularity(&graph, &[0; 6], 1.0));
    }

    #[test]
    fn degrees_include_self_loops() {
        let graph = CompressedGraph::from_weighted_edges(2, &[(0, 1, 3.0)], vec![1.0, 0.0]);
        assert_eq!(weighted_degrees(&graph), vec![5.0, 3.0]);
    }
}
