use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use nutriscan_core::{AskContext, IndexConfig, Metric, ProductStore, RetrievalIndex, RouterConfig};
use nutriscan_storage::{load_products, IndexSnapshotStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Grade food products and answer questions about them
#[derive(Parser, Debug)]
#[command(name = "nutriscan")]
#[command(about = "Food product grading and question answering", long_about = None)]
struct Args {
    /// Path to the product feed (JSON array)
    #[arg(short, long, default_value = "./data/products.json")]
    data: PathBuf,

    /// Directory holding the retrieval index snapshot
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Distance metric for retrieval (cosine or euclidean)
    #[arg(long, default_value = "cosine")]
    metric: String,

    /// Number of products suggested when a question matches no pattern
    #[arg(long, default_value_t = 3)]
    fallback_k: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a product card
    Product { barcode: String },
    /// Show the score breakdown of a product
    Scores { barcode: String },
    /// Look up two products side by side
    Compare { first: String, second: String },
    /// Ask a question about products
    Ask {
        query: String,
        /// Product barcode the question refers to (repeatable)
        #[arg(short, long = "barcode")]
        barcodes: Vec<String>,
    },
    /// Rebuild the retrieval index and save it to --index-dir
    BuildIndex,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let index_config = IndexConfig {
        metric: match args.metric.to_lowercase().as_str() {
            "cosine" => Metric::Cosine,
            "euclidean" => Metric::Euclidean,
            other => bail!("Unknown metric '{}', expected cosine or euclidean", other),
        },
        ..Default::default()
    };
    let router_config = RouterConfig {
        fallback_k: args.fallback_k,
    };

    info!("Starting NutriScan v{}", env!("CARGO_PKG_VERSION"));
    info!("Product feed: {:?}", args.data);

    let raw = load_products(&args.data)?;
    let store = ProductStore::from_raw(raw)?;
    info!("Product store initialized with {} products", store.count());

    if let Command::BuildIndex = args.command {
        let dir = args.index_dir.context("build-index requires --index-dir")?;
        let index = RetrievalIndex::build(&store.products(), index_config)?;
        let manifest = IndexSnapshotStore::new(&dir)?.save(&index)?;
        return print_json(&manifest);
    }

    let index = if store.is_empty() {
        warn!("Product feed is empty, retrieval fallback disabled");
        None
    } else {
        Some(open_index(&store, args.index_dir.as_ref(), index_config)?)
    };
    let ctx = AskContext::new(store, index, router_config);

    match args.command {
        Command::Product { barcode } => match ctx.store().get(&barcode) {
            Some(product) => print_json(&product),
            None => bail!("Product not found: {}", barcode),
        },
        Command::Scores { barcode } => match ctx.store().scores(&barcode) {
            Some(scores) => print_json(&scores),
            None => bail!("Product not found: {}", barcode),
        },
        Command::Compare { first, second } => print_json(&ctx.store().compare(&first, &second)),
        Command::Ask { query, barcodes } => print_json(&ctx.ask(&query, &barcodes)?),
        Command::BuildIndex => Ok(()),
    }
}

/// Load the index snapshot if one exists, otherwise build it (and save it
/// when a snapshot directory was given).
fn open_index(
    store: &ProductStore,
    index_dir: Option<&PathBuf>,
    config: IndexConfig,
) -> anyhow::Result<RetrievalIndex> {
    let Some(dir) = index_dir else {
        return Ok(RetrievalIndex::build(&store.products(), config)?);
    };

    let snapshots = IndexSnapshotStore::new(dir)?;
    if let Some(index) = snapshots.load()? {
        for mismatch in index.mismatches(store, config.metric) {
            warn!(dir = ?dir, "stale index snapshot: {}; run build-index to refresh", mismatch);
        }
        return Ok(index);
    }

    let index = RetrievalIndex::build(&store.products(), config)?;
    snapshots.save(&index)?;
    Ok(index)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
