// HTTP request handlers
use crate::domain::panel::{Panel, UiAction};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::render::render;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PowerSaveRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityReport {
    pub ratio: Option<f64>,
    pub visible: Option<bool>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard view
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = render(&state.dashboard.current());
    match json_response(&view, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Plain-text rendering of the current view
pub async fn get_dashboard_text(State(state): State<Arc<AppState>>) -> String {
    render(&state.dashboard.current()).to_string()
}

/// Stream a view for every state version
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.streaming_service.stream_dashboard();
    stream_from_receiver(rx, accepts_brotli(&headers)).await
}

pub async fn navigate(Path(panel): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let panel = match panel.parse::<Panel>() {
        Ok(panel) => panel,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    dispatch(&state, UiAction::Navigate(panel)).await
}

/// Toggle power save on an empty body, or set it from `{"enabled": bool}`
pub async fn power_save(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let action = if body.iter().all(u8::is_ascii_whitespace) {
        UiAction::TogglePowerSave
    } else {
        match Json::<PowerSaveRequest>::from_bytes(&body) {
            Ok(Json(request)) => UiAction::SetPowerSave(request.enabled),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected power save body");
                return rejection.into_response();
            }
        }
    };
    dispatch(&state, action).await
}

pub async fn toggle_menu(State(state): State<Arc<AppState>>) -> Response {
    dispatch(&state, UiAction::ToggleMenu).await
}

pub async fn report_visibility(
    State(state): State<Arc<AppState>>,
    Json(report): Json<VisibilityReport>,
) -> StatusCode {
    let ratio = match (report.ratio, report.visible) {
        (Some(ratio), _) => ratio,
        (None, Some(visible)) => {
            if visible {
                1.0
            } else {
                0.0
            }
        }
        (None, None) => return StatusCode::BAD_REQUEST,
    };

    if !state.viewport.report(ratio) {
        tracing::debug!(ratio, "visibility report with no active observer");
    }
    StatusCode::ACCEPTED
}

async fn dispatch(state: &AppState, action: UiAction) -> Response {
    match state.dashboard.dispatch(action).await {
        Some(snapshot) => Json(render(&snapshot)).into_response(),
        None => {
            tracing::warn!(?action, "dashboard is not running");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
