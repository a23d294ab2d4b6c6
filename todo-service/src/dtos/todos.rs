use crate::models::Todo;
use crate::services::{DeleteOutcome, InsertOutcome};
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize};

/// Request body for create and update. Missing or null fields decode to their
/// zero values so an absent title is reported as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.to_hex(),
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub data: Vec<TodoResponse>,
}

#[derive(Debug, Serialize)]
pub struct CreateTodoResponse {
    pub message: String,
    pub data: InsertOutcome,
    pub todo_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteTodoResponse {
    pub message: String,
    pub data: DeleteOutcome,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
