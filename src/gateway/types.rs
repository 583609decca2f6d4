//! HTTP response shapes and the `LedgerError` → status mapping (spec.md
//! §6.2, §7). Adapted from the teacher's `ApiError`/`ApiResult<T>` pattern,
//! but the success/error envelope follows the wire format this spec defines
//! rather than the teacher's `{code, msg, data}` wrapper.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{LedgerError, MissingItem};

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// spec.md §6.2's `Insufficient` error body entry: `{"item_id", "collection?",
/// "quality_level?", "required", "available"}`. `collection`/`quality_level`
/// are already translated to codes by `InventoryApi::translate_missing`
/// before the error reaches this boundary — this type only reshapes fields,
/// it never talks to the catalog itself.
#[derive(Debug, Serialize)]
pub struct MissingItemView {
    pub item_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_level: Option<String>,
    pub required: i64,
    pub available: i64,
}

impl From<&MissingItem> for MissingItemView {
    fn from(missing: &MissingItem) -> Self {
        Self {
            item_id: missing.item_key.item_id,
            collection: missing.collection_code.clone(),
            quality_level: missing.quality_code.clone(),
            required: missing.required,
            available: missing.available,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_items: Option<Vec<MissingItemView>>,
}

/// Unified API error with automatic `IntoResponse` (spec.md §6.2: `{ "error":
/// <kind>, "message": <string>, "details": <object?> }`, with `missing_items`
/// standing in for `details` on `insufficient_items`).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    missing_items: Option<Vec<MissingItemView>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: self.message,
            missing_items: self.missing_items,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let (status, kind) = match &err {
            LedgerError::UnknownCode { .. } => (StatusCode::BAD_REQUEST, "unknown_code"),
            LedgerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            LedgerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            LedgerError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            LedgerError::Insufficient { .. } => (StatusCode::CONFLICT, "insufficient_items"),
            LedgerError::ReservationExists(_) => (StatusCode::CONFLICT, "reservation_exists"),
            LedgerError::ReservationNotFound(_) => (StatusCode::NOT_FOUND, "reservation_not_found"),
            LedgerError::ReservationTerminal(_) => (StatusCode::CONFLICT, "reservation_terminal"),
            LedgerError::LogCorrupt { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "log_corrupt"),
            LedgerError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
            LedgerError::Conflict => (StatusCode::CONFLICT, "conflict"),
            LedgerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if matches!(err, LedgerError::LogCorrupt { .. }) {
            // Fatal at request scope and must alert operators (spec.md §7).
            tracing::error!(error = %err, "log corruption surfaced at the gateway boundary");
        }

        let missing_items = match &err {
            LedgerError::Insufficient { missing } => {
                Some(missing.iter().map(MissingItemView::from).collect())
            }
            _ => None,
        };

        Self {
            status,
            kind,
            message: err.to_string(),
            missing_items,
        }
    }
}
