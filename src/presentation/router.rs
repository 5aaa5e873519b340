// Route table for the dashboard HTTP surface
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_dashboard_text, health_check, navigate, power_save, report_visibility,
    stream_dashboard, toggle_menu,
};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Compression is handled in the response builders, not by a layer
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard.txt", get(get_dashboard_text))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/navigate/:panel", post(navigate))
        .route("/power-save", post(power_save))
        .route("/menu", post(toggle_menu))
        .route("/visibility", put(report_visibility))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
