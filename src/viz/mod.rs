//! Visualization export module
//!
//! Reads a finished [`AnalysisOutcome`] and writes files for external
//! rendering tools; nothing here feeds back into the analysis.

use crate::error::Result;
use crate::pipeline::AnalysisOutcome;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Node entry of the force-directed network data
#[derive(Debug, Serialize)]
pub struct NetworkNode<'a> {
    pub id: &'a str,
    pub group: u32,
    pub apps: &'a [String],
    pub app_count: usize,
    pub label: &'a str,
}

/// Link entry of the force-directed network data
#[derive(Debug, Serialize)]
pub struct NetworkLink<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub value: u32,
}

#[derive(Debug, Serialize)]
pub struct NetworkData<'a> {
    pub nodes: Vec<NetworkNode<'a>>,
    pub links: Vec<NetworkLink<'a>>,
    pub group_count: usize,
}

/// Generate visualizations from analysis results
pub fn generate_visualizations(outcome: &AnalysisOutcome, output_dir: &str) -> Result<()> {
    log::info!(
        "Generating visualizations for {} clusters",
        outcome.clusters.len()
    );

    let viz_dir = Path::new(output_dir).join("visualizations");
    fs::create_dir_all(&viz_dir)?;

    generate_network_data(outcome, &viz_dir)?;
    generate_graphml(outcome, &viz_dir)?;
    generate_html_summary(outcome, &viz_dir)?;

    log::info!("Visualizations generated successfully");

    Ok(())
}

/// Nodes grouped by community and weighted links, ready for a D3 force layout
pub fn network_data(outcome: &AnalysisOutcome) -> NetworkData<'_> {
    let nodes = outcome
        .graph
        .nodes()
        .map(|node| NetworkNode {
            id: &node.id,
            group: outcome
                .partition
                .community_of(&node.id)
                .map_or(0, |community| community.0),
            apps: &node.apps,
            app_count: node.app_count(),
            label: &node.id,
        })
        .collect();

    let links = outcome
        .graph
        .edges()
        .map(|(source, target, value)| NetworkLink {
            source,
            target,
            value,
        })
        .collect();

    NetworkData {
        nodes,
        links,
        group_count: outcome.clusters.len(),
    }
}

fn generate_network_data(outcome: &AnalysisOutcome, viz_dir: &Path) -> Result<()> {
    log::info!("Generating network data file");

    let file = File::create(viz_dir.join("network.json"))?;
    serde_json::to_writer_pretty(file, &network_data(outcome))?;

    Ok(())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write the whole server graph as GraphML with cluster and label attributes
fn generate_graphml(outcome: &AnalysisOutcome, viz_dir: &Path) -> Result<()> {
    log::info!("Generating GraphML export");

    let mut file = File::create(viz_dir.join("server_graph.graphml"))?;

    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(file, "  <key id=\"cluster\" for=\"node\" attr.name=\"cluster\" attr.type=\"int\"/>")?;
    writeln!(file, "  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>")?;
    writeln!(file, "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"int\"/>")?;
    writeln!(file, "  <graph id=\"G\" edgedefault=\"undirected\">")?;

    for node in outcome.graph.nodes() {
        let cluster = outcome
            .partition
            .community_of(&node.id)
            .map_or(0, |community| community.0);
        let label = outcome.labels.label_for(&node.id).unwrap_or_default();

        writeln!(file, "    <node id=\"{}\">", escape_xml(&node.id))?;
        writeln!(file, "      <data key=\"cluster\">{}</data>", cluster)?;
        writeln!(file, "      <data key=\"label\">{}</data>", escape_xml(label))?;
        writeln!(file, "    </node>")?;
    }

    for (edge_id, (source, target, weight)) in outcome.graph.edges().enumerate() {
        writeln!(
            file,
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\">",
            edge_id,
            escape_xml(source),
            escape_xml(target)
        )?;
        writeln!(file, "      <data key=\"weight\">{}</data>", weight)?;
        writeln!(file, "    </edge>")?;
    }

    writeln!(file, "  </graph>")?;
    writeln!(file, "</graphml>")?;

    Ok(())
}

/// Generate an HTML page summarising clusters and their labels
fn generate_html_summary(outcome: &AnalysisOutcome, viz_dir: &Path) -> Result<()> {
    log::info!("Generating HTML summary");

    let mut index_file = File::create(viz_dir.join("index.html"))?;

    writeln!(index_file, "<!DOCTYPE html>")?;
    writeln!(index_file, "<html lang=\"en\">")?;
    writeln!(index_file, "<head>")?;
    writeln!(index_file, "  <meta charset=\"UTF-8\">")?;
    writeln!(index_file, "  <title>Server Cluster Analysis</title>")?;
    writeln!(index_file, "  <style>")?;
    writeln!(index_file, "    body {{ font-family: Arial, sans-serif; margin: 20px; }}")?;
    writeln!(index_file, "    .cluster-list {{ display: flex; flex-wrap: wrap; }}")?;
    writeln!(index_file, "    .cluster-card {{ border: 1px solid #ddd; margin: 10px; padding: 15px; border-radius: 5px; width: 300px; }}")?;
    writeln!(index_file, "    .stats {{ background-color: #f9f9f9; padding: 15px; border-radius: 5px; }}")?;
    writeln!(index_file, "  </style>")?;
    writeln!(index_file, "</head>")?;
    writeln!(index_file, "<body>")?;
    writeln!(index_file, "  <h1>Server Cluster Analysis</h1>")?;

    writeln!(index_file, "  <div class=\"stats\">")?;
    writeln!(index_file, "    <p>Total Servers: {}</p>", outcome.graph.node_count())?;
    writeln!(index_file, "    <p>Total Clusters: {}</p>", outcome.clusters.len())?;
    writeln!(index_file, "    <p>Isolated Servers: {}</p>", outcome.labels.isolated().len())?;
    writeln!(index_file, "    <p>Modularity: {:.4}</p>", outcome.modularity)?;
    writeln!(index_file, "  </div>")?;

    writeln!(index_file, "  <div class=\"cluster-list\">")?;
    for stat in outcome.statistics.iter().take(50) {
        let label = outcome
            .labels
            .cluster_label(stat.cluster_id)
            .map(str::to_string)
            .or_else(|| {
                outcome
                    .clusters
                    .members(stat.cluster_id)
                    .and_then(|members| members.first())
                    .and_then(|server| outcome.labels.label_for(server))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        writeln!(index_file, "    <div class=\"cluster-card\">")?;
        writeln!(index_file, "      <h3>Cluster {}</h3>", stat.cluster_id)?;
        writeln!(index_file, "      <p>Label: {}</p>", escape_xml(&label))?;
        writeln!(index_file, "      <p>Servers: {}</p>", stat.num_servers)?;
        writeln!(index_file, "      <p>Unique applications: {}</p>", stat.num_unique_apps)?;
        writeln!(index_file, "      <p>Applications per server: {:.2}</p>", stat.avg_apps_per_server)?;
        writeln!(index_file, "    </div>")?;
    }
    writeln!(index_file, "  </div>")?;

    writeln!(index_file, "</body>")?;
    writeln!(index_file, "</html>")?;

    Ok(())
}
