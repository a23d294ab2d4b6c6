use super::store::{DeleteOutcome, InsertOutcome, StoreError, TodoStore, UpdateOutcome};
use crate::models::{Todo, TodoChanges};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    Client as MongoClient, Collection,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoTodoStore {
    client: MongoClient,
    todos: Collection<Todo>,
}

impl MongoTodoStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;

        // The driver connects lazily; ping so an unreachable server fails startup.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB is unreachable: {}", e);
                AppError::from(e)
            })?;

        let todos = client.database(database).collection(collection);
        tracing::info!(database = %database, collection = %collection, "Database Connected");
        Ok(Self { client, todos })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn todos(&self) -> &Collection<Todo> {
        &self.todos
    }
}

#[async_trait]
impl TodoStore for MongoTodoStore {
    async fn insert(&self, todo: &Todo) -> Result<InsertOutcome, StoreError> {
        let result = self.todos.insert_one(todo, None).await?;
        let inserted_id = result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .unwrap_or_else(|| result.inserted_id.to_string());
        Ok(InsertOutcome { inserted_id })
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        // Raw documents so a single bad record surfaces as a decode error.
        let mut cursor = self
            .todos
            .clone_with_type::<Document>()
            .find(None, None)
            .await?;

        let mut todos = Vec::new();
        while let Some(raw) = cursor.try_next().await? {
            todos.push(bson::from_document::<Todo>(raw)?);
        }
        Ok(todos)
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: &TodoChanges,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .todos
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": changes.title.as_str(), "completed": changes.completed } },
                None,
            )
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        let result = self.todos.delete_one(doc! { "_id": id }, None).await?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client disconnected");
    }
}
