//! Retrieval and aggregation across the catalog.
//!
//! Three modes feed the same tail: every full record goes through
//! [`normalize_record`], then the request filters, then pagination.
//!
//! - Direct search issues one catalog search.
//! - Category discovery walks the configured categories in order, shuffles each
//!   listing and fetches details one by one until it has enough matches for the
//!   requested page plus one.
//! - Random discovery fans out batches of random lookups, over-fetching to
//!   compensate for filter attrition.
//!
//! Single-call failures are logged and skipped. Only a search that fails, or a
//! discovery whose first call finds the catalog unreachable with nothing ever
//! succeeding, surfaces as an error.

mod pacing;
mod pagination;
mod request;

pub use pagination::{page_offset, paginate};
pub use request::{parse_complexity, RecipeQuery, RecipeRequest, RetrievalMode};

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};

use crate::catalog::{Catalog, MealRecord};
use crate::config::RetrievalConfig;
use crate::error::{CatalogError, RetrievalError};
use crate::normalize::normalize_record;
use crate::types::{Page, Recipe, SearchFilters};
use pacing::{retry_rate_limited, BackoffBudget, Pacer};

/// Counters reported when a retrieval finishes.
#[derive(Debug, Default)]
struct RetrievalStats {
    fetched: usize,
    kept: usize,
}

/// Runs retrieval requests against one catalog.
///
/// Holds no per-request state: seen ids, pacing and backoff budgets live
/// inside each [`RecipeOrchestrator::fetch_page`] call.
pub struct RecipeOrchestrator<C> {
    catalog: C,
    config: RetrievalConfig,
}

impl<C: Catalog> RecipeOrchestrator<C> {
    pub fn new(catalog: C, config: RetrievalConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Build one page of recipes for the request.
    ///
    /// Cancellation is checked between iterations; a cancelled request returns
    /// whatever was gathered so far.
    ///
    /// `total_results` is only a catalog total for direct search. Discovery
    /// modes report how many matches they gathered, which category discovery
    /// caps at `offset + page_size + 1`; use `has_more` to decide on paging
    /// rather than showing the number as a count.
    pub async fn fetch_page(
        &self,
        request: &RecipeRequest,
        cancel: &CancellationToken,
    ) -> Result<Page<Recipe>, RetrievalError> {
        let span = info_span!(
            "retrieve_recipes",
            mode = request.mode.as_str(),
            page = request.page,
            page_size = request.page_size
        );

        async move {
            let mut stats = RetrievalStats::default();
            let page = match &request.mode {
                RetrievalMode::Search(term) => {
                    self.direct_search(term, request, cancel, &mut stats).await?
                }
                RetrievalMode::CategoryDiscovery => {
                    self.discover_by_category(request, cancel, &mut stats).await?
                }
                RetrievalMode::Random => self.discover_random(request, cancel, &mut stats).await?,
            };

            tracing::info!(
                fetched = stats.fetched,
                kept = stats.kept,
                returned = page.results.len(),
                total = page.total_results,
                has_more = page.has_more,
                cancelled = cancel.is_cancelled(),
                "retrieval finished"
            );
            Ok::<_, RetrievalError>(page)
        }
        .instrument(span)
        .await
    }

    async fn direct_search(
        &self,
        term: &str,
        request: &RecipeRequest,
        cancel: &CancellationToken,
        stats: &mut RetrievalStats,
    ) -> Result<Page<Recipe>, RetrievalError> {
        let mut budget = self.backoff_budget();
        let catalog = &self.catalog;
        let records =
            retry_rate_limited(&mut budget, cancel, "search", move || catalog.search(term)).await?;

        let kept: Vec<Recipe> = records
            .iter()
            .filter_map(|record| admit(record, &request.filters, stats))
            .collect();

        Ok(paginate(kept, request.page, request.page_size))
    }

    async fn discover_by_category(
        &self,
        request: &RecipeRequest,
        cancel: &CancellationToken,
        stats: &mut RetrievalStats,
    ) -> Result<Page<Recipe>, RetrievalError> {
        // One past the page is enough to know whether another page exists
        let target = request
            .offset()
            .saturating_add(request.page_size)
            .saturating_add(1);

        let catalog = &self.catalog;
        let mut budget = self.backoff_budget();
        let mut pacer = Pacer::new(self.config.item_delay);
        let mut rng = self.shuffler();
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept: Vec<Recipe> = Vec::new();
        let mut listed_any = false;
        let mut first_failure: Option<CatalogError> = None;

        'categories: for category in &self.config.categories {
            if cancel.is_cancelled() || kept.len() >= target {
                break;
            }

            let listing = retry_rate_limited(&mut budget, cancel, "list_category", move || {
                catalog.list_category(category)
            })
            .await;
            let mut previews = match listing {
                Ok(previews) => {
                    listed_any = true;
                    previews
                }
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "category listing failed, skipping category");
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                    continue;
                }
            };
            previews.shuffle(&mut rng);
            tracing::debug!(category = %category, previews = previews.len(), "category listed");

            for preview in &previews {
                if cancel.is_cancelled() || kept.len() >= target {
                    break 'categories;
                }
                let id = preview.id.trim();
                if id.is_empty() || !seen.insert(id.to_string()) {
                    continue;
                }

                pacer.wait().await;
                let lookup =
                    retry_rate_limited(&mut budget, cancel, "lookup", move || catalog.lookup(id))
                        .await;
                match lookup {
                    Ok(Some(record)) => {
                        pacer.record_success();
                        if let Some(recipe) = admit(&record, &request.filters, stats) {
                            kept.push(recipe);
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(id, category = %category, "listed recipe has no detail record")
                    }
                    Err(e) => {
                        tracing::warn!(id, category = %category, error = %e, "detail fetch failed, skipping item")
                    }
                }
            }
        }

        if !listed_any {
            if let Some(e) = first_failure.filter(CatalogError::is_unreachable) {
                return Err(e.into());
            }
        }

        if budget.used() > 0 {
            tracing::debug!(backoffs = budget.used(), "rate-limit backoffs taken");
        }
        Ok(paginate(kept, request.page, request.page_size))
    }

    async fn discover_random(
        &self,
        request: &RecipeRequest,
        cancel: &CancellationToken,
        stats: &mut RetrievalStats,
    ) -> Result<Page<Recipe>, RetrievalError> {
        let wanted = request.page_size;
        let per_round = wanted.saturating_mul(self.config.random_overfetch.max(1));
        let concurrency = self.config.random_concurrency.max(1);

        let catalog = &self.catalog;
        let mut budget = self.backoff_budget();
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept: Vec<Recipe> = Vec::new();
        let mut last_round_kept = 0;
        let mut any_success = false;
        let mut first_failure: Option<CatalogError> = None;

        for round in 1..=self.config.random_rounds.max(1) {
            if cancel.is_cancelled() || kept.len() >= wanted {
                break;
            }

            let outcomes: Vec<Result<Option<MealRecord>, CatalogError>> = stream::iter(0..per_round)
                .map(|_| catalog.random())
                .buffer_unordered(concurrency)
                .take_until(cancel.cancelled())
                .collect()
                .await;

            let mut round_kept = 0;
            let mut rate_limited = false;
            for outcome in outcomes {
                match outcome {
                    Ok(Some(record)) => {
                        any_success = true;
                        if !seen.insert(record.id.trim().to_string()) {
                            continue;
                        }
                        if let Some(recipe) = admit(&record, &request.filters, stats) {
                            kept.push(recipe);
                            round_kept += 1;
                        }
                    }
                    Ok(None) => any_success = true,
                    Err(e) if e.is_rate_limited() => rate_limited = true,
                    Err(e) => {
                        tracing::warn!(round, error = %e, "random lookup failed, skipping");
                        if first_failure.is_none() {
                            first_failure = Some(e);
                        }
                    }
                }
            }
            tracing::debug!(round, kept = round_kept, "random round finished");
            last_round_kept = round_kept;

            if rate_limited {
                tracing::warn!(round, "catalog rate limited random lookups, backing off");
                if !budget.back_off(cancel).await {
                    break;
                }
            } else if round_kept == 0 {
                break;
            }
        }

        if !any_success {
            if let Some(e) = first_failure.filter(CatalogError::is_unreachable) {
                return Err(e.into());
            }
        }

        let total_results = kept.len();
        kept.truncate(wanted);
        Ok(Page {
            results: kept,
            total_results,
            has_more: last_round_kept > 0,
        })
    }

    fn backoff_budget(&self) -> BackoffBudget {
        BackoffBudget::new(self.config.backoff, self.config.max_backoffs)
    }

    fn shuffler(&self) -> StdRng {
        match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Normalize a record and keep it if it passes the filters.
fn admit(
    record: &MealRecord,
    filters: &SearchFilters,
    stats: &mut RetrievalStats,
) -> Option<Recipe> {
    stats.fetched += 1;
    let Some(recipe) = normalize_record(record) else {
        tracing::debug!(id = %record.id, "record missing id or title, skipping");
        return None;
    };
    if !filters.matches(&recipe) {
        return None;
    }
    stats.kept += 1;
    Some(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;
    use std::time::Duration;

    fn record(id: &str, category: &str) -> MealRecord {
        MealRecord {
            id: id.to_string(),
            name: Some(format!("{} dish {}", category, id)),
            category: Some(category.to_string()),
            instructions: Some("Mix.\nServe.".to_string()),
            ..Default::default()
        }
    }

    fn quick_config() -> RetrievalConfig {
        RetrievalConfig::default()
            .item_delay(Duration::ZERO)
            .backoff(Duration::from_millis(500), 3)
            .shuffle_seed(1)
    }

    fn request(mode: RetrievalMode, page_size: usize) -> RecipeRequest {
        RecipeRequest {
            mode,
            page: 1,
            page_size,
            filters: SearchFilters::default(),
        }
    }

    #[tokio::test]
    async fn test_category_discovery_stops_one_past_the_page() {
        let beef: Vec<_> = (1..=10).map(|n| record(&format!("b{}", n), "Beef")).collect();
        let catalog = MockCatalog::new().with_category("Beef", beef);
        let orchestrator =
            RecipeOrchestrator::new(catalog, quick_config().categories(["Beef", "Chicken"]));

        let page = orchestrator
            .fetch_page(&request(RetrievalMode::CategoryDiscovery, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.results.len(), 3);
        assert!(page.has_more);
        assert_eq!(orchestrator.catalog().call_count("lookup:"), 4);
        assert_eq!(orchestrator.catalog().call_count("category:Chicken"), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_empty_page() {
        let catalog = MockCatalog::new().with_category("Beef", vec![record("1", "Beef")]);
        let orchestrator = RecipeOrchestrator::new(catalog, quick_config());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let page = orchestrator
            .fetch_page(&request(RetrievalMode::CategoryDiscovery, 12), &cancel)
            .await
            .unwrap();
        assert!(page.is_empty());
        assert!(orchestrator.catalog().calls().is_empty());
    }

    #[tokio::test]
    async fn test_random_dedupes_repeats() {
        let catalog = MockCatalog::new().with_random(vec![record("1", "Beef"), record("2", "Pork")]);
        let orchestrator = RecipeOrchestrator::new(catalog, quick_config());

        let page = orchestrator
            .fetch_page(&request(RetrievalMode::Random, 5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total_results, 2);
        // second round found nothing new
        assert!(!page.has_more);
    }
}
