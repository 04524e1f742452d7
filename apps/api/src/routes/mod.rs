pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::business::handlers as business;
use crate::generation::handlers as posts;
use crate::social::handlers as social;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Business API
        .route(
            "/api/v1/business",
            post(business::handle_create)
                .get(business::handle_list_all)
                .delete(business::handle_clear_all),
        )
        .route("/api/v1/business/ids", get(business::handle_list_ids))
        .route(
            "/api/v1/business/:id",
            get(business::handle_get_by_id).patch(business::handle_set_field),
        )
        .route(
            "/api/v1/business/by-name/:name",
            get(business::handle_get_by_name),
        )
        // Post-request API
        .route(
            "/api/v1/posts/:id",
            post(posts::handle_send_post_request).get(posts::handle_get_post_data),
        )
        .route("/api/v1/posts/:id/status", get(posts::handle_get_post_status))
        // Social API
        .route(
            "/api/v1/social/twitter/:id",
            post(social::handle_post_to_twitter),
        )
        .with_state(state)
}
