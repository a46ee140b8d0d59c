//! Community detection over the server graph
//!
//! The rest of the pipeline only relies on the [`CommunityOracle`] contract:
//! given a non-empty graph, return a partition assigning every node. Ids are
//! opaque; no particular count or modularity optimum is assumed.

use crate::cluster::Partition;
use crate::config::{Config, OracleKind};
use crate::error::{AnalyzerError, Result};
use crate::graph::algorithms::{modularity, weighted_degrees};
use crate::graph::{CompressedGraph, ServerGraph};
use std::collections::{BTreeMap, HashMap};

/// An algorithm that partitions the server graph into communities
pub trait CommunityOracle {
    /// Short name used in logs and summaries
    fn name(&self) -> &'static str;

    /// Assign every node of a non-empty graph to a community.
    ///
    /// Must be deterministic for a given graph. Returns
    /// [`AnalyzerError::EmptyInput`] for a graph with no nodes.
    fn detect(&self, graph: &ServerGraph) -> Result<Partition>;
}

/// Create the oracle selected in the configuration
pub fn oracle_from_config(config: &Config) -> Box<dyn CommunityOracle> {
    match config.oracle {
        OracleKind::Louvain => Box::new(Louvain::from_config(config)),
        OracleKind::ConnectedComponents => Box::new(ConnectedComponents),
    }
}

/// Renumber community labels to 0.. in order of first appearance
fn renumber_by_discovery(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect()
}

/// Weighted multi-level Louvain modularity optimisation.
///
/// Nodes are visited in index order and candidate communities in ascending
/// order, with strict improvement required to move, so the result depends only
/// on the graph.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma)
    resolution: f64,
    /// Maximum local-moving sweeps per level
    max_iter: usize,
    /// Maximum levels of aggregation
    max_levels: usize,
    /// Minimum modularity improvement to continue
    min_modularity_gain: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            resolution: config.resolution,
            max_iter: config.max_iter,
            max_levels: config.max_levels,
            min_modularity_gain: config.min_modularity_gain,
        }
    }

    /// Community number for every node of a compressed graph
    pub fn detect_communities(&self, graph: &CompressedGraph) -> Vec<usize> {
        let mut assignment: Vec<usize> = (0..graph.node_count).collect();
        if graph.total_weight() == 0.0 {
            return assignment;
        }

        let mut level = graph.clone();
        let mut previous = f64::NEG_INFINITY;

        for depth in 0..self.max_levels {
            let (communities, moved) = self.local_moving(&level);
            if !moved {
                break;
            }

            let current = modularity(&level, &communities, self.resolution);
            if current - previous < self.min_modularity_gain {
                break;
            }
            previous = current;

            for community in assignment.iter_mut() {
                *community = communities[*community];
            }

            let next = aggregate(&level, &communities);
            log::debug!(
                "Louvain level {}: {} -> {} nodes, modularity {:.6}",
                depth,
                level.node_count,
                next.node_count,
                current
            );
            level = next;
        }

        renumber_by_discovery(&assignment)
    }

    /// Greedy node moves until a sweep changes nothing.
    /// Returns the renumbered communities and whether any node moved.
    fn local_moving(&self, graph: &CompressedGraph) -> (Vec<usize>, bool) {
        self.local_moving_from(graph, (0..graph.node_count).collect())
    }

    /// Local moving starting from an arbitrary assignment of ids below `node_count`.
    ///
    /// A node whose best option is a loss leaves for an empty community.
    fn local_moving_from(
        &self,
        graph: &CompressedGraph,
        mut communities: Vec<usize>,
    ) -> (Vec<usize>, bool) {
        let n = graph.node_count;
        let two_m = 2.0 * graph.total_weight();
        let degrees = weighted_degrees(graph);

        let mut totals = vec![0.0; n];
        let mut sizes = vec![0usize; n];
        for (node, &community) in communities.iter().enumerate() {
            totals[community] += degrees[node];
            sizes[community] += 1;
        }
        let mut empty: Vec<usize> = (0..n).rev().filter(|&c| sizes[c] == 0).collect();
        let mut any_moved = false;

        for _ in 0..self.max_iter {
            let mut moved = false;

            for node in 0..n {
                let current = communities[node];
                let k = degrees[node];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (neighbor, weight) in graph.neighbors(node) {
                    *links.entry(communities[neighbor]).or_insert(0.0) += weight;
                }

                totals[current] -= k;
                sizes[current] -= 1;
                let gain = |community: usize, link: f64| {
                    link - self.resolution * totals[community] * k / two_m
                };

                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));

                for (&community, &link) in &links {
                    let candidate = gain(community, link);
                    if candidate > best_gain {
                        best_gain = candidate;
                        best = community;
                    }
                }

                // an empty community has zero gain
                if best_gain < 0.0 && sizes[current] > 0 {
                    while let Some(candidate) = empty.pop() {
                        if sizes[candidate] == 0 {
                            best = candidate;
                            break;
                        }
                    }
                }

                totals[best] += k;
                sizes[best] += 1;
                if sizes[current] == 0 {
                    empty.push(current);
                }
                if best != current {
                    communities[node] = best;
                    moved = true;
                    any_moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        (renumber_by_discovery(&communities), any_moved)
    }
}

/// Collapse each community into one node; internal weight becomes a self-loop
fn aggregate(graph: &CompressedGraph, communities: &[usize]) -> CompressedGraph {
    let count = communities.iter().copied().max().map_or(0, |max| max + 1);
    let mut self_loops = vec![0.0; count];
    let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for node in 0..graph.node_count {
        let a = communities[node];
        self_loops[a] += graph.self_loops[node];

        for (neighbor, weight) in graph.neighbors(node) {
            if node >= neighbor {
                continue;
            }
            let b = communities[neighbor];
            if a == b {
                self_loops[a] += weight;
            } else {
                *between.entry((a.min(b), a.max(b))).or_insert(0.0) += weight;
            }
        }
    }

    let edges: Vec<(usize, usize, f64)> = between
        .into_iter()
        .map(|((a, b), weight)| (a, b, weight))
        .collect();

    CompressedGraph::from_weighted_edges(count, &edges, self_loops)
}

impl CommunityOracle for Louvain {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn detect(&self, graph: &ServerGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(AnalyzerError::EmptyInput);
        }

        log::info!(
            "Detecting communities with Louvain (resolution {})",
            self.resolution
        );

        let compressed = CompressedGraph::from_server_graph(graph);
        log::debug!("Compressed adjacency uses {} bytes", compressed.memory_usage());

        let communities = self.detect_communities(&compressed);
        let partition = Partition::from_node_communities(graph, &communities);

        log::info!(
            "Louvain found {} communities",
            communities.iter().max().map_or(0, |max| max + 1)
        );
        Ok(partition)
    }
}

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        if self.size[root_x as usize] > self.size[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.size[root_x as usize] += self.size[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.size[root_y as usize] += self.size[root_x as usize];
        }
    }
}

/// One community per connected component of the server graph
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl CommunityOracle for ConnectedComponents {
    fn name(&self) -> &'static str {
        "connected-components"
    }

    fn detect(&self, graph: &ServerGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(AnalyzerError::EmptyInput);
        }

        log::info!("Finding connected components");

        let mut sets = DisjointSets::new(graph.node_count());
        for (a, b, _) in graph.indexed_edges() {
            sets.union(a as u32, b as u32);
        }

        let roots: Vec<usize> = (0..graph.node_count())
            .map(|node| sets.find(node as u32) as usize)
            .collect();
        let communities = renumber_by_discovery(&roots);

        log::info!(
            "Found {} connected components",
            communities.iter().max().map_or(0, |max| max + 1)
        );
        Ok(Partition::from_node_communities(graph, &communities))
    }
}
