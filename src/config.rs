//! Configuration management for the server cluster analyzer

/// Community detection algorithm used to partition the server graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleKind {
    /// Weighted multi-level modularity optimisation
    Louvain,
    /// One community per connected component
    ConnectedComponents,
}

/// How candidate server pairs are enumerated when building edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStrategy {
    /// Compare every unordered pair of servers
    Pairwise,
    /// Only compare servers that share at least one application
    Bucketed,
}

/// Default configuration for the server cluster analyzer
#[derive(Debug, Clone)]
pub struct Config {
    /// Community detection algorithm
    pub oracle: OracleKind,

    /// Louvain resolution parameter (higher values give smaller clusters)
    pub resolution: f64,

    /// Maximum Louvain aggregation levels
    pub max_levels: usize,

    /// Maximum local-moving sweeps per Louvain level
    pub max_iter: usize,

    /// Minimum modularity improvement required to keep aggregating
    pub min_modularity_gain: f64,

    /// Edge enumeration strategy
    pub edge_strategy: EdgeStrategy,

    /// Server count from which pair weights are computed in parallel
    pub parallel_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle: OracleKind::Louvain,
            resolution: 1.0,
            max_levels: 10,
            max_iter: 100,
            min_modularity_gain: 1e-7,
            edge_strategy: EdgeStrategy::Pairwise,
            parallel_threshold: 512,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values for the common knobs
    pub fn new(oracle: OracleKind, resolution: f64, edge_strategy: EdgeStrategy) -> Self {
        Self {
            oracle,
            resolution,
            edge_strategy,
            ..Self::default()
        }
    }
}
