//! Core library functions for the server cluster analyzer
//!
//! Servers are grouped by shared application footprint: a weighted
//! co-occurrence graph is built from server records, partitioned by a
//! community oracle, and every cluster receives a policy label and summary
//! statistics.

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod storage;
pub mod viz;

pub use cluster::{ClusterStatistic, Clusters, CommunityId, CommunityOracle, LabelSet, Partition};
pub use config::{Config, EdgeStrategy, OracleKind};
pub use data::ServerRecord;
pub use error::{AnalyzerError, Result};
pub use graph::{GraphBuilder, ServerGraph};
pub use pipeline::{analyze, run, AnalysisOutcome};
