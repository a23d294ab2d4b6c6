use crate::models::{Todo, TodoChanges};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Query(#[from] mongodb::error::Error),

    #[error(transparent)]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("store connection is closed")]
    Closed,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub inserted_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// The todo collection. Implementations are shared across all request tasks.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, todo: &Todo) -> Result<InsertOutcome, StoreError>;

    /// Every todo in natural order. Fails as a whole if any record fails to decode.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Sets `title` and `completed` only. Matching nothing is not an error.
    async fn update(&self, id: ObjectId, changes: &TodoChanges)
        -> Result<UpdateOutcome, StoreError>;

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn close(&self);
}
