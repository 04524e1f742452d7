//! Axum route handlers for the business API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::business::{BusinessView, ProfileField};
use crate::state::AppState;
use crate::store::NewBusiness;

#[derive(Debug, Deserialize)]
pub struct CreateBusinessRequest {
    pub name: String,
    pub description: String,
    pub specifics: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub field: ProfileField,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BusinessListResponse {
    pub businesses: BTreeMap<u64, BusinessView>,
}

#[derive(Debug, Serialize)]
pub struct BusinessIdsResponse {
    pub ids: Vec<u64>,
}

/// POST /api/v1/business
pub async fn handle_create(
    State(state): State<AppState>,
    Json(request): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<BusinessView>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    let record = state
        .store
        .create(NewBusiness {
            name: request.name,
            description: request.description,
            specifics: request.specifics,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /api/v1/business/:id
pub async fn handle_get_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BusinessView>, AppError> {
    let record = state.store.get(id).await?;
    Ok(Json(record.into()))
}

/// GET /api/v1/business/by-name/:name
pub async fn handle_get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BusinessView>, AppError> {
    let record = state.store.get_by_name(&name).await?;
    Ok(Json(record.into()))
}

/// GET /api/v1/business
pub async fn handle_list_all(
    State(state): State<AppState>,
) -> Result<Json<BusinessListResponse>, AppError> {
    let businesses = state
        .store
        .list_all()
        .await?
        .into_iter()
        .map(|(id, record)| (id, record.into()))
        .collect();
    Ok(Json(BusinessListResponse { businesses }))
}

/// GET /api/v1/business/ids
pub async fn handle_list_ids(
    State(state): State<AppState>,
) -> Result<Json<BusinessIdsResponse>, AppError> {
    let ids = state.store.list_ids().await?;
    Ok(Json(BusinessIdsResponse { ids }))
}

/// PATCH /api/v1/business/:id
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<SetFieldRequest>,
) -> Result<Json<BusinessView>, AppError> {
    if request.value.trim().is_empty() {
        return Err(AppError::Validation("value cannot be empty".to_string()));
    }
    let record = state.store.set_field(id, request.field, request.value).await?;
    Ok(Json(record.into()))
}

/// DELETE /api/v1/business
///
/// The store supports no per-record deletion; this wipes everything.
pub async fn handle_clear_all(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
