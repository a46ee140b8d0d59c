//! Graph construction module

use crate::config::{Config, EdgeStrategy};
use crate::data::ServerRecord;
use crate::error::Result;
use crate::graph::ServerGraph;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Builds the server co-occurrence graph from server records
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    /// How candidate pairs are enumerated
    strategy: EdgeStrategy,

    /// Server count from which pairwise weights are computed on the rayon pool
    parallel_threshold: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.edge_strategy,
            parallel_threshold: config.parallel_threshold,
        }
    }

    pub fn with_strategy(mut self, strategy: EdgeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Build the graph: one node per record, one edge per pair of servers
    /// sharing at least one application, weighted by the shared count.
    pub fn build(&self, records: &[ServerRecord]) -> Result<ServerGraph> {
        log::info!("Building server graph from {} records", records.len());

        let mut graph = ServerGraph::with_capacity(records.len(), 0);
        for record in records {
            graph.add_server(record)?;
        }

        let app_sets: Vec<HashSet<&str>> = graph.nodes().map(|node| node.app_set()).collect();

        let edges = match self.strategy {
            EdgeStrategy::Pairwise if app_sets.len() >= self.parallel_threshold => {
                pairwise_edges_parallel(&app_sets)
            }
            EdgeStrategy::Pairwise => pairwise_edges(&app_sets),
            EdgeStrategy::Bucketed => bucketed_edges(&app_sets),
        };

        // Single writer: edges are inserted in (a, b) order regardless of strategy
        for &(a, b, weight) in &edges {
            graph.add_weighted_edge(a, b, weight);
        }

        log::info!(
            "Built server graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }
}

fn shared_count(a: &HashSet<&str>, b: &HashSet<&str>) -> u32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|app| large.contains(*app)).count() as u32
}

/// Compare every unordered pair sequentially
fn pairwise_edges(app_sets: &[HashSet<&str>]) -> Vec<(usize, usize, u32)> {
    let n = app_sets.len();
    let mut edges = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            let weight = shared_count(&app_sets[i], &app_sets[j]);
            if weight > 0 {
                edges.push((i, j, weight));
            }
        }
    }

    edges
}

/// Compare every unordered pair on the rayon pool
fn pairwise_edges_parallel(app_sets: &[HashSet<&str>]) -> Vec<(usize, usize, u32)> {
    let n = app_sets.len();
    log::debug!("Computing {} pair weights in parallel", n * n.saturating_sub(1) / 2);

    let mut edges: Vec<(usize, usize, u32)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            ((i + 1)..n).filter_map(move |j| {
                let weight = shared_count(&app_sets[i], &app_sets[j]);
                (weight > 0).then_some((i, j, weight))
            })
        })
        .collect();

    edges.par_sort_unstable();
    edges
}

/// Only compare servers that appear together in some application bucket
fn bucketed_edges(app_sets: &[HashSet<&str>]) -> Vec<(usize, usize, u32)> {
    let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, apps) in app_sets.iter().enumerate() {
        for &app in apps {
            buckets.entry(app).or_default().push(idx);
        }
    }

    log::debug!("Indexed {} applications into buckets", buckets.len());

    let mut edges = Vec::new();
    for (i, apps) in app_sets.iter().enumerate() {
        let mut shared: HashMap<usize, u32> = HashMap::new();
        for app in apps {
            for &j in &buckets[app] {
                if j > i {
                    *shared.entry(j).or_insert(0) += 1;
                }
            }
        }

        let mut row: Vec<(usize, usize, u32)> =
            shared.into_iter().map(|(j, weight)| (i, j, weight)).collect();
        row.sort_unstable();
        edges.extend(row);
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;

    fn sample_records() -> Vec<ServerRecord> {
        vec![
            ServerRecord::new("A", ["web", "db"]),
            ServerRecord::new("B", ["web", "db"]),
            ServerRecord::new("C", ["cache"]),
        ]
    }

    fn fleet(n: usize) -> Vec<ServerRecord> {
        (0..n)
            .map(|i| {
                let apps = vec![
                    format!("app{}", i % 7),
                    format!("app{}", i % 5),
                    format!("svc{}", i % 3),
                ];
                ServerRecord::new(format!("srv{}", i), apps)
            })
            .collect()
    }

    fn sorted_edges(graph: &ServerGraph) -> Vec<(String, String, u32)> {
        let mut edges: Vec<_> = graph
            .edges()
            .map(|(a, b, w)| {
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                (a.to_string(), b.to_string(), w)
            })
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn weights_count_shared_apps() {
        let graph = GraphBuilder::new().build(&sample_records()).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("A", "B"), Some(2));
        assert_eq!(graph.edge_weight("A", "C"), None);
        assert_eq!(graph.degree("C"), 0);
    }

    #[test]
    fn every_edge_matches_exact_intersection() {
        let records = fleet(40);
        let graph = GraphBuilder::new().build(&records).unwrap();

        for a in &records {
            for b in &records {
                if a.server == b.server {
                    continue;
                }
                let sa: HashSet<&String> = a.apps.iter().collect();
                let sb: HashSet<&String> = b.apps.iter().collect();
                let expected = sa.intersection(&sb).count() as u32;
                let actual = graph.edge_weight(&a.server, &b.server);
                if expected == 0 {
                    assert_eq!(actual, None);
                } else {
                    assert_eq!(actual, Some(expected));
                }
            }
        }
    }

    #[test]
    fn strategies_produce_identical_edges() {
        let records = fleet(60);
        let sequential = GraphBuilder::new()
            .with_parallel_threshold(usize::MAX)
            .build(&records)
            .unwrap();
        let parallel = GraphBuilder::new()
            .with_parallel_threshold(0)
            .build(&records)
            .unwrap();
        let bucketed = GraphBuilder::new()
            .with_strategy(EdgeStrategy::Bucketed)
            .build(&records)
            .unwrap();

        assert_eq!(sorted_edges(&sequential), sorted_edges(&parallel));
        assert_eq!(sorted_edges(&sequential), sorted_edges(&bucketed));
    }

    #[test]
    fn server_without_apps_is_isolated_node() {
        let records = vec![
            ServerRecord::new("bare", Vec::<String>::new()),
            ServerRecord::new("web", ["nginx"]),
        ];
        let graph = GraphBuilder::new().build(&records).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn duplicate_ids_fail_the_build() {
        let records = vec![
            ServerRecord::new("A", ["web"]),
            ServerRecord::new("A", ["db"]),
        ];
        let err = GraphBuilder::new().build(&records).unwrap_err();
        assert!(matches!(err, AnalyzerError::DuplicateServer(_)));
    }

    #[test]
    fn empty_input_gives_empty_graph() {
        let graph = GraphBuilder::new().build(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
