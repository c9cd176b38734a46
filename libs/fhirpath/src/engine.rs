//! Expression engine
//!
//! Orchestrates the pipeline: Parse → AST → HIR → Evaluation.
//!
//! Compiled [`Expression`]s are immutable and cheap to clone, so one
//! compiled expression can be evaluated from many threads at once.

use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::compiler::Compiler;
use crate::constants::ConstantTable;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::hir::HirNode;
use crate::options::EvalOptions;
use crate::parser::Parser;
use crate::terminology::TerminologyService;
use crate::value::Collection;

/// A compiled expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: Arc<str>,
    hir: Arc<HirNode>,
}

impl Expression {
    /// The expression text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn hir(&self) -> &HirNode {
        &self.hir
    }

    /// Shared handle to the compiled tree, used to inline this expression
    /// as a constant in other expressions.
    pub fn to_shared_hir(&self) -> Arc<HirNode> {
        Arc::clone(&self.hir)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Expression engine
///
/// Holds evaluation options and an optional terminology service for
/// `memberOf()`. The engine keeps no per-evaluation state.
#[derive(Clone, Default)]
pub struct Engine {
    options: EvalOptions,
    terminology: Option<Arc<dyn TerminologyService>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("terminology", &self.terminology.is_some())
            .finish()
    }
}

impl Engine {
    pub fn new(options: EvalOptions) -> Self {
        Self {
            options,
            terminology: None,
        }
    }

    /// Install the service `memberOf()` delegates to.
    pub fn with_terminology(mut self, service: Arc<dyn TerminologyService>) -> Self {
        self.terminology = Some(service);
        self
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn terminology(&self) -> Option<&dyn TerminologyService> {
        self.terminology.as_deref()
    }

    // ============================================================================
    // Compilation
    // ============================================================================

    /// Compile `expr`, resolving `%name` references against `constants`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ferrum_fhirpath::{ConstantTable, Engine, Value};
    ///
    /// let engine = Engine::default();
    /// let constants = ConstantTable::new().with_literal("use", Value::string("official"));
    /// let expr = engine.compile("name.where(use = %use).family", &constants)?;
    /// assert_eq!(expr.source(), "name.where(use = %use).family");
    /// # Ok::<(), ferrum_fhirpath::Error>(())
    /// ```
    pub fn compile(&self, expr: &str, constants: &ConstantTable) -> Result<Expression> {
        let mut parser = Parser::with_max_depth(expr, self.options.max_depth)?;
        let ast = parser.parse()?;
        let hir = Compiler::new(constants).compile(&ast)?;

        tracing::trace!(expression = expr, "compiled expression");

        Ok(Expression {
            source: Arc::from(expr),
            hir: Arc::new(hir),
        })
    }

    // ============================================================================
    // Evaluation
    // ============================================================================

    /// Evaluate a compiled expression against a context.
    pub fn evaluate(&self, expr: &Expression, ctx: &Context) -> Result<Collection> {
        Evaluator::new(self).evaluate(&expr.hir, ctx)
    }

    /// Evaluate against a resource given as JSON.
    pub fn evaluate_json(&self, expr: &Expression, resource: JsonValue) -> Result<Collection> {
        let ctx = Context::from_json(Arc::new(resource))?;
        self.evaluate(expr, &ctx)
    }

    /// Evaluate one compiled expression against many JSON resources.
    ///
    /// Each input gets its own result, in input order. Malformed JSON or a
    /// failing evaluation only affects the resource it came from.
    pub fn evaluate_batch(&self, expr: &Expression, json_strings: &[&str]) -> Vec<Result<Collection>> {
        json_strings
            .iter()
            .map(|json_str| {
                let resource: JsonValue = serde_json::from_str(json_str)
                    .map_err(|e| Error::Evaluation(format!("Invalid JSON: {}", e)))?;
                self.evaluate_json(expr, resource)
            })
            .collect()
    }

    /// Compile and evaluate in one step, without constants.
    pub fn evaluate_expr(&self, expr: &str, ctx: &Context) -> Result<Collection> {
        let compiled = self.compile(expr, &ConstantTable::new())?;
        self.evaluate(&compiled, ctx)
    }
}
