//! Named constants available to `%name` references
//!
//! Constants are resolved while compiling, never per evaluation. A literal
//! constant becomes a literal node; an expression constant is inlined as a
//! sub-tree and so evaluates against whatever focus references it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::hir::HirNode;
use crate::value::Value;

/// Names that resolve to the root resource when no constant shadows them.
pub const RESOURCE_CONSTANTS: [&str; 2] = ["resource", "rootResource"];

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Literal(Value),
    Expression(Arc<HirNode>),
}

impl ConstantValue {
    pub(crate) fn to_hir(&self) -> HirNode {
        match self {
            ConstantValue::Literal(value) => HirNode::Literal(value.clone()),
            ConstantValue::Expression(hir) => hir.as_ref().clone(),
        }
    }
}

/// Constant table in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    entries: HashMap<Arc<str>, ConstantValue>,
    order: Vec<Arc<str>>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`. Returns the previous definition if the name was
    /// already taken; the new value replaces it.
    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: ConstantValue) -> Option<ConstantValue> {
        let name = name.into();
        let previous = self.entries.insert(name.clone(), value);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn with_literal(mut self, name: impl Into<Arc<str>>, value: Value) -> Self {
        self.insert(name, ConstantValue::Literal(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConstantValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|name| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
