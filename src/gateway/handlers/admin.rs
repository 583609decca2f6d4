//! `/admin/inventory/*` handlers — admin-scoped (spec.md §6.1).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::gateway::auth::{TokenScope, require_admin};
use crate::gateway::handlers::inventory::WriteResponse;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiResult;
use crate::inventory::AdjustItem;

#[derive(Debug, Deserialize)]
pub struct AdjustItemBody {
    pub section: String,
    pub item_id: Uuid,
    pub collection: Option<String>,
    pub quality_level: Option<String>,
    pub delta: i64,
}

impl From<AdjustItemBody> for AdjustItem {
    fn from(body: AdjustItemBody) -> Self {
        AdjustItem {
            section_code: body.section,
            item_id: body.item_id,
            collection_code: body.collection,
            quality_code: body.quality_level,
            delta: body.delta,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub operation_id: Uuid,
    pub target_user: i64,
    pub reason: String,
    pub items: Vec<AdjustItemBody>,
}

pub async fn adjust(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<WriteResponse> {
    let admin_id = require_admin(scope)?;
    let items: Vec<AdjustItem> = req.items.into_iter().map(AdjustItem::from).collect();
    let ids = state
        .inventory
        .adjust(admin_id, req.target_user, req.operation_id, &items, &req.reason)
        .await?;
    Ok(Json(WriteResponse { operation_row_ids: ids }))
}
