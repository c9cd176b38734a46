//! Evaluation context
//!
//! A context carries the current focus (`$this`) and the root resource.
//! Contexts are cheap to clone and are derived per evaluation step rather
//! than mutated.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{Collection, Value};

#[derive(Clone, Debug)]
pub struct Context {
    /// Current focus
    pub this: Collection,
    /// The resource being evaluated
    pub resource: Value,
}

impl Context {
    /// Context focused on the resource itself.
    pub fn new(resource: Value) -> Self {
        Self {
            this: Collection::singleton(resource.clone()),
            resource,
        }
    }

    /// Wrap a resource JSON tree. The tree must be an object.
    pub fn from_json(resource: Arc<JsonValue>) -> Result<Self> {
        match Value::from_json_root(resource) {
            Some(value) if value.is_node() => Ok(Self::new(value)),
            _ => Err(Error::Evaluation("resource must be a JSON object".into())),
        }
    }

    /// Same resource, new focus.
    pub fn with_focus(&self, focus: Collection) -> Self {
        Self {
            this: focus,
            resource: self.resource.clone(),
        }
    }

    /// Focus on a single item, as inside `where()` or a `forEach`.
    pub fn with_item(&self, item: Value) -> Self {
        self.with_focus(Collection::singleton(item))
    }
}
