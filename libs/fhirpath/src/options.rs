//! Engine configuration
//!
//! Options deserialize from camelCase JSON (or any serde format) and every
//! field has a default, so `{}` is a valid configuration:
//!
//! ```
//! use ferrum_fhirpath::options::{EvalOptions, GetIdStrategy};
//!
//! let options: EvalOptions = serde_json::from_str(r#"{"getId": "typeAndId"}"#).unwrap();
//! assert_eq!(options.get_id, GetIdStrategy::TypeAndId);
//! ```

use serde::{Deserialize, Serialize};

use crate::parser::DEFAULT_MAX_DEPTH;

/// How `getId()` turns a reference into an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GetIdStrategy {
    /// Logical id only: `Patient/123/_history/2` gives `123`.
    #[default]
    LastSegment,
    /// Type-qualified id: `Patient/123`.
    TypeAndId,
    /// Stable hex digest of the normalized `Type/id` reference.
    Hash,
}

/// How dates and dateTimes of different precision compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalPrecision {
    /// Undetermined comparisons (`2020` vs `2020-05`) yield empty.
    #[default]
    Strict,
    /// Compare at the coarser precision; `2020 = 2020-05` is true.
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvalOptions {
    pub get_id: GetIdStrategy,
    pub temporal_precision: TemporalPrecision,
    /// Maximum expression nesting accepted by the parser.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            get_id: GetIdStrategy::default(),
            temporal_precision: TemporalPrecision::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let options: EvalOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EvalOptions::default());
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_camel_case_fields() {
        let options: EvalOptions =
            serde_json::from_str(r#"{"getId": "hash", "temporalPrecision": "truncate", "maxDepth": 16}"#)
                .unwrap();
        assert_eq!(options.get_id, GetIdStrategy::Hash);
        assert_eq!(options.temporal_precision, TemporalPrecision::Truncate);
        assert_eq!(options.max_depth, 16);
    }
}
