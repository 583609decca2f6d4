//! Database reads behind the identifier catalog.
//!
//! Runtime-checked queries (`sqlx::query`, not the `query_as!` macro) so the
//! crate builds without a live database at compile time — the same choice
//! the teacher makes in `internal_transfer/db.rs`.

use rustc_hash::FxHashMap;
use sqlx::{PgPool, Row};

use crate::error::LedgerResult;

/// Both translation directions for a single classifier, loaded with one
/// query (spec.md §4.1: "produced by a single database read").
#[derive(Debug, Clone, Default)]
pub struct ClassifierMaps {
    pub code_to_id: FxHashMap<String, i32>,
    pub id_to_code: FxHashMap<i32, String>,
}

impl ClassifierMaps {
    pub fn len(&self) -> usize {
        self.code_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_id.is_empty()
    }
}

pub async fn load_classifier_maps(
    pool: &PgPool,
    classifier_code: &str,
) -> LedgerResult<ClassifierMaps> {
    let rows = sqlx::query(
        r#"
        SELECT ci.id AS item_id, ci.code AS item_code
        FROM classifier_items ci
        JOIN classifiers c ON c.id = ci.classifier_id
        WHERE c.code = $1
        ORDER BY ci.display_order
        "#,
    )
    .bind(classifier_code)
    .fetch_all(pool)
    .await?;

    let mut maps = ClassifierMaps::default();
    for row in rows {
        let id: i32 = row.get("item_id");
        let code: String = row.get("item_code");
        maps.code_to_id.insert(code.clone(), id);
        maps.id_to_code.insert(id, code);
    }

    Ok(maps)
}
