//! `/inventory/*` handlers — user- and service-scoped (spec.md §6.1).

use std::sync::Arc;

use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::auth::{require_service, require_user, TokenScope};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiResult;
use crate::inventory::ItemAmount;

#[derive(Debug, Deserialize)]
pub struct ItemAmountBody {
    pub item_id: Uuid,
    pub collection: Option<String>,
    pub quality_level: Option<String>,
    pub quantity: i64,
}

impl From<ItemAmountBody> for ItemAmount {
    fn from(body: ItemAmountBody) -> Self {
        ItemAmount {
            item_id: body.item_id,
            collection_code: body.collection,
            quality_code: body.quality_level,
            quantity: body.quantity,
        }
    }
}

/// `list` row (spec.md §6.2): the item's own identifier plus its class/type,
/// not a classifier-bound item code.
#[derive(Debug, Serialize)]
pub struct ItemView {
    pub item_id: Uuid,
    pub item_class: String,
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_level: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub operation_row_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub section: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListResponse> {
    let user_id = require_user(scope)?;
    let items = state.inventory.list(user_id, &query.section).await?;
    Ok(Json(ListResponse {
        items: items
            .into_iter()
            .map(|i| ItemView {
                item_id: i.item_id,
                item_class: i.item_class,
                item_type: i.item_type,
                collection: i.collection_code,
                quality_level: i.quality_code,
                quantity: i.quantity,
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub operation_id: Uuid,
    pub user_id: i64,
    pub section: String,
    pub items: Vec<ItemAmountBody>,
}

pub async fn reserve(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Json(req): Json<ReserveRequest>,
) -> ApiResult<WriteResponse> {
    require_service(scope)?;
    let items: Vec<ItemAmount> = req.items.into_iter().map(ItemAmount::from).collect();
    let ids = state
        .inventory
        .reserve(req.user_id, req.operation_id, &req.section, &items)
        .await?;
    Ok(Json(WriteResponse { operation_row_ids: ids }))
}

#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    pub operation_id: Uuid,
    pub user_id: i64,
}

pub async fn return_reserve(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Json(req): Json<ReservationRequest>,
) -> ApiResult<WriteResponse> {
    require_service(scope)?;
    let ids = state.inventory.return_reserve(req.user_id, req.operation_id).await?;
    Ok(Json(WriteResponse { operation_row_ids: ids }))
}

pub async fn consume_reserve(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Json(req): Json<ReservationRequest>,
) -> ApiResult<WriteResponse> {
    require_service(scope)?;
    let ids = state.inventory.consume_reserve(req.user_id, req.operation_id).await?;
    Ok(Json(WriteResponse { operation_row_ids: ids }))
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub operation_id: Uuid,
    pub user_id: i64,
    pub section: String,
    pub items: Vec<ItemAmountBody>,
}

pub async fn add_items(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<TokenScope>,
    Json(req): Json<AddItemsRequest>,
) -> ApiResult<WriteResponse> {
    require_service(scope)?;
    let items: Vec<ItemAmount> = req.items.into_iter().map(ItemAmount::from).collect();
    let ids = state
        .inventory
        .add(req.user_id, req.operation_id, &req.section, &items)
        .await?;
    Ok(Json(WriteResponse { operation_row_ids: ids }))
}
