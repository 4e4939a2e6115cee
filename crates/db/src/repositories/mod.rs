use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use expertise_core::domain::expertise::{ExpertiseKey, ExpertiseRecord, ExpertiseUpdate};

pub mod expertise;
pub mod memory;

pub use expertise::SqlExpertiseRepository;
pub use memory::InMemoryExpertiseRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Gateway over the single `user_expertise` collection.
///
/// `find_by_key` distinguishes an absent record (`Ok(None)`) from a store
/// failure (`Err`). `upsert` is atomic per key: concurrent calls for the same
/// member never produce two records.
#[async_trait]
pub trait ExpertiseRepository: Send + Sync {
    async fn find_by_key(
        &self,
        key: &ExpertiseKey,
    ) -> Result<Option<ExpertiseRecord>, RepositoryError>;

    /// All records in insertion order.
    async fn find_all(&self) -> Result<Vec<ExpertiseRecord>, RepositoryError>;

    async fn upsert(&self, update: ExpertiseUpdate) -> Result<ExpertiseRecord, RepositoryError>;
}

#[async_trait]
impl<R> ExpertiseRepository for Arc<R>
where
    R: ExpertiseRepository + ?Sized,
{
    async fn find_by_key(
        &self,
        key: &ExpertiseKey,
    ) -> Result<Option<ExpertiseRecord>, RepositoryError> {
        (**self).find_by_key(key).await
    }

    async fn find_all(&self) -> Result<Vec<ExpertiseRecord>, RepositoryError> {
        (**self).find_all().await
    }

    async fn upsert(&self, update: ExpertiseUpdate) -> Result<ExpertiseRecord, RepositoryError> {
        (**self).upsert(update).await
    }
}
