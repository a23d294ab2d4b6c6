use crate::dtos::{
    CreateTodoResponse, DeleteTodoResponse, MessageResponse, TodoListResponse, TodoPayload,
    TodoResponse,
};
use crate::models::{Todo, TodoChanges};
use crate::services::StoreError;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("The id is invalid".into()))
}

/// Decodes the body as JSON whatever the declared content type.
fn parse_body(body: &Bytes) -> Result<TodoPayload, AppError> {
    let Json(payload) = Json::<TodoPayload>::from_bytes(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected request body");
        AppError::InvalidBody(e.body_text())
    })?;
    Ok(payload)
}

pub async fn list_todos(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let todos = state.store.find_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list todos");
        match e {
            StoreError::Decode(_) => AppError::store_failure("Failed to decode todo", e),
            _ => AppError::store_failure("Failed to fetch todo", e),
        }
    })?;

    let data = todos.into_iter().map(TodoResponse::from).collect();
    Ok(Json(TodoListResponse { data }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_body(&body)?;
    if payload.title.is_empty() {
        return Err(AppError::BadRequest("The title is required".into()));
    }

    // `completed` from the body is ignored on create.
    let todo = Todo::new(payload.title);

    let outcome = state.store.insert(&todo).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to save todo");
        AppError::store_failure("Failed to save todo", e)
    })?;

    tracing::info!(todo_id = %todo.id, "Todo created");

    Ok((
        StatusCode::CREATED,
        Json(CreateTodoResponse {
            message: "todo created succesfully".to_string(),
            data: outcome,
            todo_id: todo.id.to_hex(),
        }),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let payload = parse_body(&body)?;
    if payload.title.is_empty() {
        return Err(AppError::BadRequest("The title field id is required".into()));
    }

    let changes = TodoChanges {
        title: payload.title,
        completed: payload.completed,
    };

    let outcome = state.store.update(id, &changes).await.map_err(|e| {
        tracing::error!(todo_id = %id, error = %e, "Failed to update todo");
        AppError::store_failure("Error while updating task", e)
    })?;

    tracing::info!(
        todo_id = %id,
        matched = outcome.matched_count,
        modified = outcome.modified_count,
        "Todo updated"
    );

    Ok(Json(MessageResponse::new("Updated Task Succesfully")))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;

    let outcome = state.store.delete(id).await.map_err(|e| {
        tracing::error!(todo_id = %id, error = %e, "Failed to delete todo");
        AppError::store_failure("Failed to delete todo", e)
    })?;

    tracing::info!(todo_id = %id, deleted = outcome.deleted_count, "Todo deleted");

    Ok(Json(DeleteTodoResponse {
        message: "todo deleted successfully".to_string(),
        data: outcome,
    }))
}
