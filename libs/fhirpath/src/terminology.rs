//! Value-set membership seam
//!
//! The engine never contacts a terminology server. `memberOf()` delegates to
//! whatever [`TerminologyService`] the caller installs on the [`Engine`].
//!
//! [`Engine`]: crate::Engine

use std::collections::{HashMap, HashSet};

use crate::value::Value;

/// Failure reported by a terminology service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TerminologyError(pub String);

/// Answers value-set membership questions.
///
/// `code` is a code string, a Coding node or a CodeableConcept node.
pub trait TerminologyService: Send + Sync {
    fn member_of(&self, code: &Value, value_set: &str) -> Result<bool, TerminologyError>;
}

/// In-memory value sets keyed by canonical URL, each a set of
/// `(system, code)` pairs. A `None` system matches bare code strings.
#[derive(Debug, Default, Clone)]
pub struct StaticValueSets {
    sets: HashMap<String, HashSet<(Option<String>, String)>>,
}

impl StaticValueSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(
        mut self,
        value_set: impl Into<String>,
        system: Option<&str>,
        code: impl Into<String>,
    ) -> Self {
        self.sets
            .entry(value_set.into())
            .or_default()
            .insert((system.map(str::to_string), code.into()));
        self
    }

    fn contains(&self, set: &HashSet<(Option<String>, String)>, system: Option<&str>, code: &str) -> bool {
        set.contains(&(system.map(str::to_string), code.to_string()))
            || set.contains(&(None, code.to_string()))
    }
}

impl TerminologyService for StaticValueSets {
    fn member_of(&self, code: &Value, value_set: &str) -> Result<bool, TerminologyError> {
        let set = self
            .sets
            .get(value_set)
            .ok_or_else(|| TerminologyError(format!("unknown value set {}", value_set)))?;

        if let Some(code) = code.as_str() {
            return Ok(self.contains(set, None, code));
        }

        let Some(json) = code.resolved_json() else {
            return Ok(false);
        };

        // CodeableConcept: any coding matches
        let codings = match json.get("coding").and_then(|c| c.as_array()) {
            Some(codings) => codings.iter().collect::<Vec<_>>(),
            None => vec![json],
        };

        Ok(codings.into_iter().any(|coding| {
            let system = coding.get("system").and_then(|s| s.as_str());
            coding
                .get("code")
                .and_then(|c| c.as_str())
                .is_some_and(|c| self.contains(set, system, c))
        }))
    }
}
