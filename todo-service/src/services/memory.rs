use super::store::{DeleteOutcome, InsertOutcome, StoreError, TodoStore, UpdateOutcome};
use crate::models::{Todo, TodoChanges};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Process-local todo collection with insertion order as natural order.
#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: RwLock<Vec<Todo>>,
    closed: AtomicBool,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: &Todo) -> Result<InsertOutcome, StoreError> {
        self.ensure_open()?;
        self.todos.write().await.push(todo.clone());
        Ok(InsertOutcome {
            inserted_id: todo.id.to_hex(),
        })
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.ensure_open()?;
        Ok(self.todos.read().await.clone())
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: &TodoChanges,
    ) -> Result<UpdateOutcome, StoreError> {
        self.ensure_open()?;
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
            return Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let modified = todo.title != changes.title || todo.completed != changes.completed;
        todo.title = changes.title.clone();
        todo.completed = changes.completed;
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        self.ensure_open()?;
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(DeleteOutcome {
            deleted_count: (before - todos.len()) as u64,
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
