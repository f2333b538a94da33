//! Caller parameters to a validated retrieval request.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::types::{Difficulty, SearchFilters, TimeRange};

/// Request parameters as the caller sends them. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeQuery {
    pub search_term: Option<String>,
    /// 1-based
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    /// Comma-separated tier names, e.g. "easy,Medium"
    pub complexity: Option<String>,
    /// Sample random records instead of walking categories when no term is given
    pub random: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalMode {
    Search(String),
    CategoryDiscovery,
    Random,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::Search(_) => "search",
            RetrievalMode::CategoryDiscovery => "category_discovery",
            RetrievalMode::Random => "random",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized request: mode chosen, page bounds clamped, filters parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRequest {
    pub mode: RetrievalMode,
    /// 1-based, never 0
    pub page: usize,
    pub page_size: usize,
    pub filters: SearchFilters,
}

impl RecipeRequest {
    pub fn offset(&self) -> usize {
        super::pagination::page_offset(self.page, self.page_size)
    }
}

impl RecipeQuery {
    pub fn into_request(self, config: &RetrievalConfig) -> RecipeRequest {
        let search_term = self
            .search_term
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());

        let mode = match &search_term {
            Some(term) => RetrievalMode::Search(term.clone()),
            None if self.random => RetrievalMode::Random,
            None => RetrievalMode::CategoryDiscovery,
        };

        let cooking_time = TimeRange::new(
            self.min_time.unwrap_or(0),
            self.max_time.unwrap_or(u32::MAX),
        );

        RecipeRequest {
            mode,
            page: self.page.unwrap_or(1).max(1),
            page_size: config.page_size(self.page_size),
            filters: SearchFilters {
                search_term,
                cooking_time,
                complexity: self
                    .complexity
                    .as_deref()
                    .map(parse_complexity)
                    .unwrap_or_default(),
            },
        }
    }
}

/// Parse a comma-separated tier list. Unknown names are dropped.
pub fn parse_complexity(csv: &str) -> BTreeSet<Difficulty> {
    csv.split(',').filter_map(Difficulty::parse).collect()
}
