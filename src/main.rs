use anyhow::Result;
use clap::{Parser, ValueEnum};

use server_cluster_analyzer::{data, pipeline, storage, viz, Config, EdgeStrategy, OracleKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Louvain,
    Components,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Pairwise,
    Bucketed,
}

#[derive(Parser, Debug)]
#[clap(
    name = "server-cluster-analyzer",
    about = "Group servers into clusters by shared applications and derive policy labels"
)]
struct Cli {
    /// Path to input file (.json list of {server, apps} or long-format .parquet)
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: String,

    /// Community detection algorithm
    #[clap(long, value_enum, default_value = "louvain")]
    algorithm: Algorithm,

    /// Louvain resolution (higher values give smaller clusters)
    #[clap(long, default_value = "1.0")]
    resolution: f64,

    /// How server pairs are compared when building the graph
    #[clap(long, value_enum, default_value = "pairwise")]
    edge_strategy: Strategy,

    /// Skip visualizations
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting server cluster analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    let oracle = match args.algorithm {
        Algorithm::Louvain => OracleKind::Louvain,
        Algorithm::Components => OracleKind::ConnectedComponents,
    };
    let edge_strategy = match args.edge_strategy {
        Strategy::Pairwise => EdgeStrategy::Pairwise,
        Strategy::Bucketed => EdgeStrategy::Bucketed,
    };
    let config = Config::new(oracle, args.resolution, edge_strategy);

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load server records
    let records = data::load_records(&args.input)?;
    log::info!("Loaded {} servers", records.len());

    // 2. Build graph, detect communities, label and analyze
    let outcome = pipeline::run(&records, &config)?;

    for stat in outcome.statistics.iter().take(10) {
        log::info!(
            "Cluster {}: {} servers, {} unique apps, {:.2} apps/server",
            stat.cluster_id,
            stat.num_servers,
            stat.num_unique_apps,
            stat.avg_apps_per_server
        );
    }

    // 3. Save results
    storage::save_results(&outcome, &args.output_dir)?;

    // 4. Generate visualizations if requested
    if !args.skip_viz && !outcome.is_empty() {
        viz::generate_visualizations(&outcome, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
