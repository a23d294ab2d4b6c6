use askama::Template;
use axum::response::Html;
use service_core::error::AppError;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {}

pub async fn home() -> Result<Html<String>, AppError> {
    HomeTemplate {}.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render home page: {}", e);
        AppError::InternalError(anyhow::anyhow!("Failed to render home page: {}", e))
    })
}
