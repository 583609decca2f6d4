//! `GET /healthz` — ambient operability, beyond spec.md's explicit scope but
//! grounded in the teacher's `gateway/handlers/health.rs::health_check`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::gateway::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub git_hash: &'static str,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "up",
        Err(err) => {
            tracing::warn!(error = %err, "health check: database unreachable");
            "down"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
        git_hash: env!("GIT_HASH"),
    })
}
