#![allow(dead_code)]

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_service::config::TodoConfig;
use todo_service::models::{Todo, TodoChanges};
use todo_service::services::{
    DeleteOutcome, InMemoryTodoStore, InsertOutcome, StoreError, TodoStore, UpdateOutcome,
};
use todo_service::startup::Application;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn TodoStore>,
    pub client: reqwest::Client,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryTodoStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn TodoStore>) -> Self {
        Self::spawn_with(store, |app| app).await
    }

    /// Spawns with `configure` applied to the built application, used to
    /// shorten the request timeout or the shutdown grace period.
    pub async fn spawn_with<F>(store: Arc<dyn TodoStore>, configure: F) -> Self
    where
        F: FnOnce(Application) -> Application,
    {
        let app = Application::build_with_store(TodoConfig::in_memory(), store)
            .await
            .expect("Failed to build test application");
        let app = configure(app);

        let port = app.port();
        let store = app.store();
        let address = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.run_with_shutdown(async move {
            let _ = shutdown_rx.await;
        }));

        // Wait for the server to answer by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
            shutdown_tx,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/todo/"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a todo and returns its id.
    pub async fn create_titled(&self, title: &str) -> String {
        let response = self.create(serde_json::json!({ "title": title })).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["todo_id"].as_str().expect("todo_id missing").to_string()
    }

    pub async fn list(&self) -> Vec<Value> {
        let response = self
            .client
            .get(self.url("/todo/"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["data"].as_array().expect("data is not an array").clone()
    }

    pub async fn update(&self, id: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/todo/{}", id)))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(self.url(&format!("/todo/{}", id)))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Triggers shutdown and waits for the server to finish.
    pub async fn shutdown(self) -> std::io::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.handle.await.expect("Server task panicked")
    }
}

/// A store whose every operation fails and which counts how often it was called.
pub struct FailingStore {
    calls: AtomicUsize,
    decode: bool,
}

impl FailingStore {
    /// Fails with a connection-style error.
    pub fn unavailable() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            decode: false,
        }
    }

    /// Fails with a record decode error.
    pub fn corrupt() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            decode: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.decode {
            let bad = doc! { "_id": ObjectId::new(), "title": 42 };
            StoreError::Decode(
                mongodb::bson::from_document::<Todo>(bad).expect_err("record should not decode"),
            )
        } else {
            StoreError::Closed
        }
    }
}

#[async_trait]
impl TodoStore for FailingStore {
    async fn insert(&self, _todo: &Todo) -> Result<InsertOutcome, StoreError> {
        Err(self.fail())
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        Err(self.fail())
    }

    async fn update(
        &self,
        _id: ObjectId,
        _changes: &TodoChanges,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(self.fail())
    }

    async fn delete(&self, _id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        Err(self.fail())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(self.fail())
    }

    async fn close(&self) {}
}

/// Wraps the in-memory store, delays updates and records the order in which
/// updates finish and the store is closed.
pub struct SlowStore {
    inner: InMemoryTodoStore,
    delay: Duration,
    events: Mutex<Vec<&'static str>>,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryTodoStore::new(),
            delay,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl TodoStore for SlowStore {
    async fn insert(&self, todo: &Todo) -> Result<InsertOutcome, StoreError> {
        self.inner.insert(todo).await
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.inner.find_all().await
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: &TodoChanges,
    ) -> Result<UpdateOutcome, StoreError> {
        tokio::time::sleep(self.delay).await;
        let outcome = self.inner.update(id, changes).await;
        self.record("update finished");
        outcome
    }

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        self.inner.delete(id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }

    async fn close(&self) {
        self.inner.close().await;
        self.record("closed");
    }
}
