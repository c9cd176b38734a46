//! High-level Intermediate Representation (HIR)
//!
//! HIR is what the evaluator walks. Compared to the AST it has:
//! - function names resolved to [`Function`] and arity checked
//! - constants substituted (literal values or inlined sub-trees)
//! - type specifiers lowered to plain names

use std::sync::Arc;

pub use crate::ast::BinaryOperator;
use crate::value::Value;

/// Resolved function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Where,
    Exists,
    Empty,
    Not,
    First,
    OfType,
    Join,
    Extension,
    GetId,
    MemberOf,
    ToQuantity,
}

/// HIR node
///
/// A `base` of `None` means the current focus.
#[derive(Debug, Clone, PartialEq)]
pub enum HirNode {
    Literal(Value),

    /// `$this`: the current focus
    This,

    /// `%resource` / `%rootResource`
    Resource,

    /// Member navigation, distributed over every item of the base
    Path {
        base: Option<Box<HirNode>>,
        name: Arc<str>,
    },

    /// Function call; arguments are evaluated lazily by the function.
    /// Type specifiers (`ofType(T)`, `getId(T)`) are lowered to string literals.
    Function {
        base: Option<Box<HirNode>>,
        function: Function,
        args: Vec<HirNode>,
    },

    Binary {
        op: BinaryOperator,
        left: Box<HirNode>,
        right: Box<HirNode>,
    },

    /// Prefix `-`
    Negate(Box<HirNode>),
}
