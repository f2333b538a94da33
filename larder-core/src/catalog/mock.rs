//! In-memory catalog for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::record::{MealPreview, MealRecord};
use super::Catalog;
use crate::error::CatalogError;

/// Mock catalog with canned responses.
///
/// Lookups of unknown ids answer `Ok(None)`, unknown categories and searches
/// answer an empty list. Every call is recorded and can be inspected with
/// [`MockCatalog::calls`].
pub struct MockCatalog {
    searches: HashMap<String, Vec<MealRecord>>,
    categories: HashMap<String, Vec<MealPreview>>,
    records: HashMap<String, MealRecord>,
    failing_ids: HashSet<String>,
    failing_categories: HashSet<String>,
    /// Remaining 429 answers per call key ("lookup:52772", "category:Beef", "random")
    rate_limits: Mutex<HashMap<String, u32>>,
    random_sequence: Vec<MealRecord>,
    random_cursor: AtomicUsize,
    unreachable: bool,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            searches: HashMap::new(),
            categories: HashMap::new(),
            records: HashMap::new(),
            failing_ids: HashSet::new(),
            failing_categories: HashSet::new(),
            rate_limits: Mutex::new(HashMap::new()),
            random_sequence: Vec::new(),
            random_cursor: AtomicUsize::new(0),
            unreachable: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer a search query (case-insensitive) with these records.
    pub fn with_search(mut self, query: &str, records: Vec<MealRecord>) -> Self {
        self.searches.insert(query.to_lowercase(), records);
        self
    }

    /// Register a category whose listing holds these records, and make each
    /// record available to lookups.
    pub fn with_category(mut self, category: &str, records: Vec<MealRecord>) -> Self {
        let previews = records
            .iter()
            .map(|record| MealPreview {
                id: record.id.clone(),
                name: record.name.clone(),
                thumbnail: record.thumbnail.clone(),
            })
            .collect();
        self.categories.insert(category.to_string(), previews);
        for record in records {
            self = self.with_record(record);
        }
        self
    }

    /// Register a category listing without backing records.
    pub fn with_previews(mut self, category: &str, previews: Vec<MealPreview>) -> Self {
        self.categories.insert(category.to_string(), previews);
        self
    }

    /// Make a record available to lookups.
    pub fn with_record(mut self, record: MealRecord) -> Self {
        self.records.insert(record.id.clone(), record);
        self
    }

    /// Fail every lookup of this id with a server error.
    pub fn with_failing_lookup(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// Fail the listing of this category with a server error.
    pub fn with_failing_category(mut self, category: &str) -> Self {
        self.failing_categories.insert(category.to_string());
        self
    }

    /// Answer the next `times` lookups of this id with 429.
    pub fn with_rate_limited_lookup(self, id: &str, times: u32) -> Self {
        self.with_rate_limit(format!("lookup:{}", id), times)
    }

    /// Answer the next `times` listings of this category with 429.
    pub fn with_rate_limited_category(self, category: &str, times: u32) -> Self {
        self.with_rate_limit(format!("category:{}", category), times)
    }

    /// Answer the next `times` random calls with 429.
    pub fn with_rate_limited_random(self, times: u32) -> Self {
        self.with_rate_limit("random".to_string(), times)
    }

    /// Records handed out by `random`, cycling once the end is reached.
    pub fn with_random(mut self, records: Vec<MealRecord>) -> Self {
        self.random_sequence = records;
        self
    }

    /// Make every call fail as if the network were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Calls made so far, in order ("search:chicken", "lookup:52772", ...).
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn with_rate_limit(self, key: String, times: u32) -> Self {
        self.rate_limits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, times);
        self
    }

    /// Record the call and apply the failure modes that hold for every kind.
    fn enter(&self, key: String) -> Result<(), CatalogError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        if self.unreachable {
            return Err(CatalogError::Unreachable(format!(
                "mock catalog is offline ({})",
                key
            )));
        }

        let mut limits = self
            .rate_limits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(remaining) = limits.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CatalogError::RateLimited {
                    retry_after_secs: None,
                });
            }
        }
        Ok(())
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn server_error(what: &str) -> CatalogError {
    CatalogError::Status {
        status: 500,
        message: format!("mock failure for {}", what),
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, CatalogError> {
        self.enter(format!("search:{}", query))?;
        Ok(self
            .searches
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_category(&self, category: &str) -> Result<Vec<MealPreview>, CatalogError> {
        self.enter(format!("category:{}", category))?;
        if self.failing_categories.contains(category) {
            return Err(server_error(category));
        }
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    async fn lookup(&self, id: &str) -> Result<Option<MealRecord>, CatalogError> {
        self.enter(format!("lookup:{}", id))?;
        if self.failing_ids.contains(id) {
            return Err(server_error(id));
        }
        Ok(self.records.get(id).cloned())
    }

    async fn random(&self) -> Result<Option<MealRecord>, CatalogError> {
        self.enter("random".to_string())?;
        if self.random_sequence.is_empty() {
            return Ok(None);
        }
        let index = self.random_cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .random_sequence
            .get(index % self.random_sequence.len())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> MealRecord {
        MealRecord {
            id: id.to_string(),
            name: Some(format!("Meal {}", id)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_category_registers_lookups() {
        let catalog = MockCatalog::new().with_category("Beef", vec![record("1"), record("2")]);
        let previews = catalog.list_category("Beef").await.unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(catalog.lookup("2").await.unwrap(), Some(record("2")));
        assert_eq!(catalog.lookup("3").await.unwrap(), None);
        assert_eq!(catalog.calls(), vec!["category:Beef", "lookup:2", "lookup:3"]);
    }

    #[tokio::test]
    async fn test_rate_limit_runs_out() {
        let catalog = MockCatalog::new()
            .with_record(record("1"))
            .with_rate_limited_lookup("1", 2);
        assert!(catalog.lookup("1").await.unwrap_err().is_rate_limited());
        assert!(catalog.lookup("1").await.unwrap_err().is_rate_limited());
        assert!(catalog.lookup("1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_random_cycles() {
        let catalog = MockCatalog::new().with_random(vec![record("1"), record("2")]);
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(catalog.random().await.unwrap().unwrap().id);
        }
        assert_eq!(ids, vec!["1", "2", "1"]);
    }

    #[tokio::test]
    async fn test_unreachable() {
        let catalog = MockCatalog::new().unreachable();
        assert!(catalog.search("x").await.unwrap_err().is_unreachable());
        assert!(catalog.random().await.unwrap_err().is_unreachable());
    }
}
