//! Retrieval policy configuration.

use std::str::FromStr;
use std::time::Duration;

/// Categories sampled by discovery mode, in visiting order.
pub const DISCOVERY_CATEGORIES: &[&str] = &[
    "Beef",
    "Chicken",
    "Dessert",
    "Lamb",
    "Pasta",
    "Pork",
    "Seafood",
    "Side",
    "Starter",
    "Vegan",
    "Vegetarian",
    "Breakfast",
    "Goat",
    "Miscellaneous",
];

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 50;

/// How the orchestrator paces, retries and samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub categories: Vec<String>,
    /// Pause between successful detail fetches
    pub item_delay: Duration,
    /// Sleep after an observed 429
    pub backoff: Duration,
    /// Total 429-triggered sleeps allowed per request
    pub max_backoffs: u32,
    pub random_overfetch: usize,
    pub random_rounds: usize,
    pub random_concurrency: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Fixed seed for the category shuffle; entropy when unset
    pub shuffle_seed: Option<u64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            categories: DISCOVERY_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            item_delay: Duration::from_millis(100),
            backoff: Duration::from_millis(1000),
            max_backoffs: 5,
            random_overfetch: 3,
            random_rounds: 3,
            random_concurrency: 4,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            shuffle_seed: None,
        }
    }
}

impl RetrievalConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Environment variables:
    /// - `LARDER_ITEM_DELAY_MS`: pause between successful detail fetches (default 100)
    /// - `LARDER_BACKOFF_MS`: sleep after a 429 (default 1000)
    /// - `LARDER_MAX_BACKOFFS`: 429 sleeps allowed per request (default 5)
    /// - `LARDER_RANDOM_OVERFETCH`: random-mode over-fetch multiplier (default 3)
    /// - `LARDER_RANDOM_ROUNDS`: random-mode fetch rounds (default 3)
    /// - `LARDER_RANDOM_CONCURRENCY`: random-mode fan-out width (default 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            item_delay: env_parse("LARDER_ITEM_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.item_delay),
            backoff: env_parse("LARDER_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
            max_backoffs: env_parse("LARDER_MAX_BACKOFFS").unwrap_or(defaults.max_backoffs),
            random_overfetch: env_parse("LARDER_RANDOM_OVERFETCH")
                .unwrap_or(defaults.random_overfetch),
            random_rounds: env_parse("LARDER_RANDOM_ROUNDS").unwrap_or(defaults.random_rounds),
            random_concurrency: env_parse("LARDER_RANDOM_CONCURRENCY")
                .unwrap_or(defaults.random_concurrency),
            ..defaults
        }
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn backoff(mut self, backoff: Duration, max_backoffs: u32) -> Self {
        self.backoff = backoff;
        self.max_backoffs = max_backoffs;
        self
    }

    pub fn random_sampling(mut self, overfetch: usize, rounds: usize, concurrency: usize) -> Self {
        self.random_overfetch = overfetch;
        self.random_rounds = rounds;
        self.random_concurrency = concurrency;
        self
    }

    pub fn shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Clamp a requested page size to `1..=max_page_size`, using the default when absent.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamped() {
        let config = RetrievalConfig::default();
        assert_eq!(config.page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(500)), MAX_PAGE_SIZE);
        assert_eq!(config.page_size(Some(20)), 20);
    }

    #[test]
    fn test_builder_setters() {
        let config = RetrievalConfig::default()
            .categories(["Beef", "Vegan"])
            .backoff(Duration::from_millis(10), 2)
            .random_sampling(2, 1, 8)
            .shuffle_seed(7);
        assert_eq!(config.categories, vec!["Beef", "Vegan"]);
        assert_eq!(config.max_backoffs, 2);
        assert_eq!(config.random_concurrency, 8);
        assert_eq!(config.shuffle_seed, Some(7));
    }

    #[test]
    fn test_defaults_visit_fourteen_categories() {
        assert_eq!(RetrievalConfig::default().categories.len(), 14);
    }
}
