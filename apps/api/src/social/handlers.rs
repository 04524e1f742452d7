//! Axum route handlers for the social publish API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::post::PostStatus;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub id: u64,
    pub tweet_id: String,
}

/// POST /api/v1/social/twitter/:id
///
/// Publishes the stored caption and image for the given business. Requires a
/// completed post request.
pub async fn handle_post_to_twitter(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PublishResponse>, AppError> {
    let record = state.store.get(id).await?;
    let request = record
        .post_request
        .ok_or_else(|| AppError::NotFound(format!("Business {id} has no post request")))?;

    if request.is_in_progress() {
        return Err(AppError::Validation(format!(
            "post request for business {id} is still in progress"
        )));
    }
    if request.status != PostStatus::Completed {
        return Err(AppError::Validation(format!(
            "post request for business {id} did not complete"
        )));
    }
    let response = request.ai_response.ok_or_else(|| {
        AppError::Validation(format!("post request for business {id} has no content"))
    })?;

    info!("Publishing post for business {id}");
    let posted = state
        .twitter
        .post(&response.caption_text, &response.picture_url)
        .await?;

    Ok(Json(PublishResponse {
        id,
        tweet_id: posted.tweet_id,
    }))
}
