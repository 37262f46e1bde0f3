use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use backend_application::AppState;

#[derive(serde::Serialize)]
struct HealthStatus {
    status: &'static str,
}

pub async fn health_live() -> impl IntoResponse {
    Json(HealthStatus { status: "ok" })
}

pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.event_repo.list_published().await {
        Ok(_) => (StatusCode::OK, Json(HealthStatus { status: "ok" })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus { status: "store unavailable" }),
        ),
    }
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.render_prometheus(),
    )
}
