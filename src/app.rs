use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/users/:user/profile", put(handlers::put_profile))
        .route("/api/users/:user/profile", get(handlers::get_profile))
        .route("/api/users/:user/progress", post(handlers::log_progress))
        .route("/api/users/:user/progress", get(handlers::list_progress))
        .route(
            "/api/users/:user/progress/today",
            get(handlers::get_today_progress),
        )
        .route("/api/users/:user/cravings", post(handlers::log_craving))
        .route(
            "/api/users/:user/cravings/stats",
            get(handlers::get_craving_stats),
        )
        .route("/api/users/:user/journal", post(handlers::add_journal_entry))
        .route("/api/users/:user/journal", get(handlers::list_journal))
        .route("/api/users/:user/stats", get(handlers::get_stats))
        .route(
            "/api/users/:user/achievements",
            get(handlers::list_achievements),
        )
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .with_state(state)
}
