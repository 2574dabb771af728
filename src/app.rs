use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/timer", get(handlers::get_timer))
        .route("/api/timer/start", post(handlers::timer_start))
        .route("/api/timer/pause", post(handlers::timer_pause))
        .route("/api/timer/reset", post(handlers::timer_reset))
        .route("/api/timer/edit/begin", post(handlers::edit_begin))
        .route("/api/timer/edit/commit", post(handlers::edit_commit))
        .route("/api/timer/edit/cancel", post(handlers::edit_cancel))
        .route("/api/activity", get(handlers::get_activity))
        .route("/api/activity/reset", post(handlers::activity_reset))
        .with_state(state)
}
