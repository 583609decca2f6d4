//! Classifier reference data and `translate` schema types (spec.md §3.1).

/// Which direction a `translate` call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateDirection {
    /// External code string -> internal identifier.
    CodeToId,
    /// Internal identifier -> external code string.
    IdToCode,
}

/// Describes which fields of a request/response object are classifier-bound.
///
/// `translate` (catalog::Catalog::translate) walks a schema built from these
/// entries instead of reflecting over a dynamic map (spec.md §9, "Dynamic
/// request objects with interleaved codes/ids").
#[derive(Debug, Clone, Copy)]
pub struct TranslatedField {
    pub field_name: &'static str,
    pub classifier_code: &'static str,
}

pub const fn field(field_name: &'static str, classifier_code: &'static str) -> TranslatedField {
    TranslatedField {
        field_name,
        classifier_code,
    }
}
