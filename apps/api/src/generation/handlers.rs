//! Axum route handlers for the post-request API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::workflow::{run_post_request, PostRequestInput};
use crate::models::post::{AiResponse, PostStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendPostRequest {
    pub mood: String,
    pub tone: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SendPostResponse {
    pub id: u64,
    pub status: PostStatus,
    pub ai_response: AiResponse,
}

#[derive(Debug, Serialize)]
pub struct PostDataResponse {
    pub id: u64,
    pub status: PostStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<AiResponse>,
}

#[derive(Debug, Serialize)]
pub struct PostStatusResponse {
    pub id: u64,
    pub status: PostStatus,
}

/// POST /api/v1/posts/:id
///
/// Records the request, runs the five-stage chain, and returns the final
/// content. A failure leaves the record marked `Failed` and surfaces the
/// error.
pub async fn handle_send_post_request(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<SendPostRequest>,
) -> Result<Json<SendPostResponse>, AppError> {
    for (field, value) in [
        ("mood", &request.mood),
        ("tone", &request.tone),
        ("description", &request.description),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} cannot be empty")));
        }
    }

    let input = PostRequestInput {
        mood: request.mood,
        tone: request.tone,
        description: request.description,
    };
    let ai_response = run_post_request(state.store.as_ref(), &state.llm, id, input).await?;

    Ok(Json(SendPostResponse {
        id,
        status: PostStatus::Completed,
        ai_response,
    }))
}

/// GET /api/v1/posts/:id
///
/// Returns the stored request status and, when completed, the generated
/// content. A failed request is reported as failed, never as success.
pub async fn handle_get_post_data(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PostDataResponse>, AppError> {
    let record = state.store.get(id).await?;
    let request = record
        .post_request
        .ok_or_else(|| AppError::NotFound(format!("Business {id} has no post request")))?;

    Ok(Json(PostDataResponse {
        id,
        status: request.status,
        requested_at: request.requested_at,
        ai_response: request.ai_response,
    }))
}

/// GET /api/v1/posts/:id/status
pub async fn handle_get_post_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PostStatusResponse>, AppError> {
    let record = state.store.get(id).await?;
    let request = record
        .post_request
        .ok_or_else(|| AppError::NotFound(format!("Business {id} has no post request")))?;

    Ok(Json(PostStatusResponse {
        id,
        status: request.status,
    }))
}
