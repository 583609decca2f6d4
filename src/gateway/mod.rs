//! HTTP gateway: router assembly and server bootstrap (spec.md §6.1). A thin
//! adapter translating external HTTP calls into Inventory API (C7) calls —
//! routing, JSON, and auth live here, domain logic does not (spec.md §1).

pub mod auth;
pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use state::AppState;

fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/inventory", get(handlers::inventory::list))
}

fn private_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/inventory/reserve", post(handlers::inventory::reserve))
        .route("/inventory/return-reserve", post(handlers::inventory::return_reserve))
        .route("/inventory/consume-reserve", post(handlers::inventory::consume_reserve))
        .route("/inventory/add-items", post(handlers::inventory::add_items))
        .route("/admin/inventory/adjust", post(handlers::admin::adjust))
}

/// Every route under `/api/v1` runs the same bearer-parsing middleware
/// (spec.md §6.1 assigns a different token *kind* per route, not a
/// different auth *mechanism* — each handler enforces its own required
/// scope via `require_user`/`require_service`/`require_admin`).
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(private_routes())
        .layer(from_fn(auth::authenticate));

    Router::new()
        .route("/healthz", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Binds and serves the router, matching the teacher's fatal-exit-on-bind-
/// failure pattern (`gateway::run_server`).
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("0.0.0.0:{port}");

    let listener = TcpListener::bind(&addr).await.map_err(|err| {
        tracing::error!(error = %err, %addr, "failed to bind gateway listener");
        err
    })?;

    tracing::info!(%addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
