use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/meetings",
            get(handlers::meetings::list_meetings).post(handlers::meetings::create_meeting),
        )
        .route(
            "/api/meetings/:share_link",
            get(handlers::meetings::get_meeting)
                .put(handlers::meetings::update_meeting)
                .delete(handlers::meetings::delete_meeting),
        )
        .route(
            "/api/meetings/:share_link/responses",
            get(handlers::responses::list_responses).post(handlers::responses::submit_response),
        )
        .route(
            "/api/meetings/:share_link/grid",
            get(handlers::responses::get_grid),
        )
}
