use axum::{extract::Query, Json};
use serde::Deserialize;

use crate::shared::journal;

#[derive(Deserialize)]
pub struct JournalListParams {
    pub limit: Option<u64>,
}

/// GET /api/journal
pub async fn list_recent(
    Query(params): Query<JournalListParams>,
) -> Result<Json<Vec<contracts::shared::journal::JournalEntry>>, axum::http::StatusCode> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    match journal::repository::list_recent(limit).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            tracing::error!("Failed to list subscription journal: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/journal
pub async fn clear_all() -> axum::http::StatusCode {
    match journal::repository::clear_all().await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to clear subscription journal: {}", e);
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
