//! Domain error type shared by every ledger component.
//!
//! Mirrors the way `account::validation::ValidationError` and
//! `funding::error::TransferError` are each a single `thiserror` enum in the
//! teacher repo: one error type per concern, propagated with `?`, mapped to
//! HTTP at the gateway boundary only.

use thiserror::Error;

use crate::item_key::ItemKey;

/// One entry of a `check_sufficient` diagnostic (spec.md §4.5, §6.2).
///
/// `collection_code`/`quality_code` start `None` — engine/executor have no
/// catalog access and raise this with just the raw `item_key`; the Inventory
/// API fills them in (`InventoryApi::translate_missing`) before the error
/// reaches the gateway boundary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MissingItem {
    #[serde(skip)]
    pub item_key: ItemKey,
    pub collection_code: Option<String>,
    pub quality_code: Option<String>,
    pub required: i64,
    pub available: i64,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unknown code '{code}' for classifier '{classifier}'")]
    UnknownCode { classifier: String, code: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("insufficient items")]
    Insufficient { missing: Vec<MissingItem> },

    #[error("reservation {0} already exists")]
    ReservationExists(String),

    #[error("reservation {0} not found")]
    ReservationNotFound(String),

    #[error("reservation {0} is in a terminal state")]
    ReservationTerminal(String),

    #[error("operation log is corrupt for item key {item_key}")]
    LogCorrupt { item_key: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("transaction conflict, retries exhausted")]
    Conflict,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                LedgerError::StorageUnavailable(err.to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => LedgerError::Internal(format!("{err} (sqlstate {code})")),
                None => LedgerError::Internal(err.to_string()),
            },
            _ => LedgerError::Internal(err.to_string()),
        }
    }
}

/// True if `err` is a Postgres `40001` serialization_failure — the only
/// commit-time error `executor::execute_batch` retries (spec.md §4.6 step 5).
pub fn is_serialization_failure(err: &LedgerError) -> bool {
    matches!(err, LedgerError::Internal(msg) if msg.contains("sqlstate 40001"))
}

pub type LedgerResult<T> = Result<T, LedgerError>;
