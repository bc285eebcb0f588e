//! ingredient-images: resolve recipe ingredient lines to thumbnail URLs.
//!
//! Single-binary Tokio application that:
//! 1. Normalizes ingredient lines into search terms (one batched LLM call)
//! 2. Looks up catalog thumbnails in paced, concurrent batches
//! 3. Streams progressive results to the terminal as they accumulate

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use catalog_client::CatalogClient;
use common::{AppConfig, IngredientCatalog, KeyValueStore, TermCompletion};
use kv_cache::{JsonFileStore, MemoryStore, Namespace, SystemClock, TtlCache};
use llm_client::CompletionClient;
use pipeline::{BatchScheduler, ImageFeed, ImageResolver, TermNormalizer};

/// Ingredient image resolver
#[derive(Parser)]
#[command(name = "ingredient-images", about = "Resolve ingredient lines to thumbnail URLs")]
struct Cli {
    /// Ingredient lines to resolve.
    ingredients: Vec<String>,

    /// Read ingredient lines from a file (one per line) instead.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Override configured batch size.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override configured inter-batch delay in milliseconds.
    #[arg(long)]
    batch_delay_ms: Option<u64>,

    /// Override configured cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Keep the cache in memory only.
    #[arg(long)]
    no_cache_persist: bool,

    /// Probe the catalog with a single lookup, then exit.
    #[arg(long)]
    check_catalog: bool,
}

fn load_ingredients(cli: &Cli) -> Result<Vec<String>> {
    if let Some(path) = &cli.file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        return Ok(contents
            .lines()
            .map(|line| line.to_string())
            .filter(|line| !line.trim().is_empty())
            .collect());
    }
    Ok(cli.ingredients.clone())
}

fn build_store(cfg: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    if cfg.cache.persist {
        let store = JsonFileStore::open(std::path::Path::new(&cfg.cache.dir))
            .with_context(|| format!("opening cache store in {}", cfg.cache.dir))?;
        Ok(Arc::new(store))
    } else {
        Ok(Arc::new(MemoryStore::new()))
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ingredient_images=info,pipeline=info,llm_client=info,catalog_client=info,kv_cache=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(batch_size) = cli.batch_size {
        cfg.batch.batch_size = batch_size.max(1);
    }
    if let Some(delay) = cli.batch_delay_ms {
        cfg.batch.batch_delay_ms = delay;
    }
    if let Some(dir) = &cli.cache_dir {
        cfg.cache.dir = dir.display().to_string();
    }
    if cli.no_cache_persist {
        cfg.cache.persist = false;
    }

    info!(
        "Batching: size={}, delay={}ms; cache: {} ({})",
        cfg.batch.batch_size,
        cfg.batch.batch_delay_ms,
        if cfg.cache.persist { cfg.cache.dir.as_str() } else { "in-memory" },
        if cfg.cache.persist { "persistent" } else { "ephemeral" },
    );

    if let Err(e) = run(cli, cfg).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cfg: AppConfig) -> Result<()> {
    // ── Shared cache ─────────────────────────────────────────────────
    let store = build_store(&cfg)?;
    let cache = TtlCache::new(store, Arc::new(SystemClock));

    let norm_stats = cache.stats(Namespace::Normalization).await;
    let image_stats = cache.stats(Namespace::Image).await;
    info!(
        "Cache: {} normalization entries, {} image entries",
        norm_stats.count, image_stats.count
    );

    // ── Service clients ──────────────────────────────────────────────
    let completion: Option<Arc<dyn TermCompletion>> = if cfg.anthropic_api_key.is_empty() {
        warn!("ANTHROPIC_API_KEY not set — terms will not be simplified");
        None
    } else {
        Some(Arc::new(CompletionClient::new(
            cfg.anthropic_api_key.clone(),
            cfg.llm.model.clone(),
            cfg.llm.timeout_ms,
            cfg.llm.max_retries,
        )))
    };

    let catalog: Option<Arc<dyn IngredientCatalog>> = if cfg.catalog_api_key.is_empty() {
        warn!("CATALOG_API_KEY not set — no images will resolve");
        None
    } else {
        Some(Arc::new(CatalogClient::new(
            cfg.catalog_api_key.clone(),
            cfg.catalog.base_url.clone(),
            cfg.catalog.requests_per_sec,
            cfg.catalog.timeout_ms,
        )))
    };

    // ── Check-catalog mode ───────────────────────────────────────────
    if cli.check_catalog {
        let Some(catalog) = catalog else {
            bail!("--check-catalog requires CATALOG_API_KEY");
        };
        info!("Probing catalog...");
        match catalog.search_image("garlic").await {
            Ok(Some(url)) => info!("✅ Catalog reachable: garlic → {}", url),
            Ok(None) => warn!("Catalog reachable but returned no image for 'garlic'"),
            Err(e) => bail!("catalog probe failed: {}", e),
        }
        return Ok(());
    }

    // ── Resolve ──────────────────────────────────────────────────────
    let ingredients = load_ingredients(&cli)?;
    if ingredients.is_empty() {
        bail!("no ingredients given (pass lines as arguments or use --file)");
    }
    info!("Resolving {} ingredient lines", ingredients.len());

    let scheduler = BatchScheduler::new(
        TermNormalizer::new(completion, cache.clone()),
        ImageResolver::new(catalog, cache),
        cfg.batch.batch_size,
        Duration::from_millis(cfg.batch.batch_delay_ms),
    );
    let feed = ImageFeed::new(Arc::new(scheduler), true);
    let mut rx = feed.subscribe();

    let handle = feed
        .set_ingredients(ingredients.clone())
        .context("no run started — ingredient list was empty after dedup")?;

    // Print progressive snapshots until the run settles.
    while rx.changed().await.is_ok() {
        let snap = rx.borrow_and_update().clone();
        info!(
            "Progress: {}/{} attempted, {} images{}",
            snap.loaded_count,
            snap.total_count,
            snap.images.len(),
            if snap.loading { "" } else { " (done)" },
        );
        if !snap.loading {
            break;
        }
    }
    handle.await.context("resolution task panicked")?;

    let snap = feed.snapshot();
    if let Some(e) = &snap.error {
        warn!("Run finished with error: {}", e);
    }

    let mut seen = std::collections::HashSet::new();
    for ingredient in &ingredients {
        if !seen.insert(ingredient.as_str()) {
            continue;
        }
        match snap.images.get(ingredient) {
            Some(url) => println!("{ingredient}\t{url}"),
            None => println!("{ingredient}\t-"),
        }
    }

    Ok(())
}
