//! Boundary to the external recipe catalog.
//!
//! The engine only needs four lookups from the catalog. They sit behind the
//! [`Catalog`] trait so the retrieval loop can run against the real HTTP
//! service or an in-memory mock.

mod client;
mod mock;
mod record;

pub use client::{CatalogClientBuilder, HttpCatalog, DEFAULT_CATALOG_URL};
pub use mock::MockCatalog;
pub use record::{MealPreview, MealRecord, MAX_INGREDIENT_FIELDS};

pub(crate) use record::non_empty;

use async_trait::async_trait;

use crate::error::CatalogError;

/// Lookups the engine issues against the recipe catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Free-text search by recipe name.
    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, CatalogError>;

    /// Previews of every recipe in a category.
    async fn list_category(&self, category: &str) -> Result<Vec<MealPreview>, CatalogError>;

    /// Full record by id. `Ok(None)` when the id is unknown.
    async fn lookup(&self, id: &str) -> Result<Option<MealRecord>, CatalogError>;

    /// One random full record.
    async fn random(&self) -> Result<Option<MealRecord>, CatalogError>;
}
