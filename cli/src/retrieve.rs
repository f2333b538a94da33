//! Catalog-backed retrieval commands.

use anyhow::{Context, Result};
use clap::Args;
use larder_core::{HttpCatalog, RecipeOrchestrator, RecipeQuery, RetrievalConfig};
use tokio_util::sync::CancellationToken;

/// Paging and filter flags shared by every retrieval command.
#[derive(Args, Debug, Clone)]
pub struct RetrieveArgs {
    /// Page number, starting at 1
    #[arg(long)]
    page: Option<usize>,
    /// Results per page (default 12, max 50)
    #[arg(long)]
    page_size: Option<usize>,
    /// Minimum cooking time in minutes
    #[arg(long)]
    min_time: Option<u32>,
    /// Maximum cooking time in minutes
    #[arg(long)]
    max_time: Option<u32>,
    /// Comma-separated difficulty tiers, e.g. "easy,medium"
    #[arg(long)]
    complexity: Option<String>,
    /// Catalog API base URL
    #[arg(long, env = "LARDER_CATALOG_URL")]
    catalog_url: Option<String>,
}

impl RetrieveArgs {
    fn query(&self, search_term: Option<&str>, random: bool) -> RecipeQuery {
        RecipeQuery {
            search_term: search_term.map(str::to_string),
            page: self.page,
            page_size: self.page_size,
            min_time: self.min_time,
            max_time: self.max_time,
            complexity: self.complexity.clone(),
            random,
        }
    }
}

pub async fn search(term: &str, args: RetrieveArgs, cancel: CancellationToken) -> Result<()> {
    let query = args.query(Some(term), false);
    run(query, args, RetrievalConfig::from_env(), cancel).await
}

pub async fn discover(
    args: RetrieveArgs,
    seed: Option<u64>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut config = RetrievalConfig::from_env();
    if let Some(seed) = seed {
        config = config.shuffle_seed(seed);
    }
    let query = args.query(None, false);
    run(query, args, config, cancel).await
}

pub async fn random(args: RetrieveArgs, cancel: CancellationToken) -> Result<()> {
    let query = args.query(None, true);
    run(query, args, RetrievalConfig::from_env(), cancel).await
}

/// Fetch one page and print it as JSON to stdout.
async fn run(
    query: RecipeQuery,
    args: RetrieveArgs,
    config: RetrievalConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let mut builder = HttpCatalog::builder();
    if let Some(url) = args.catalog_url {
        builder = builder.base_url(url);
    }
    let catalog = builder.build().context("Failed to build catalog client")?;

    let request = query.into_request(&config);
    let orchestrator = RecipeOrchestrator::new(catalog, config);
    let page = orchestrator
        .fetch_page(&request, &cancel)
        .await
        .context("Recipe retrieval failed")?;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
