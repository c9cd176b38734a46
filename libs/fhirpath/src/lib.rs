//! FHIRPath subset engine for tabular views over FHIR resources
//!
//! This crate compiles and evaluates the FHIRPath subset that view
//! definitions use:
//! 1. **Parser** → AST (Abstract Syntax Tree)
//! 2. **Compiler** → HIR (functions resolved, constants substituted)
//! 3. **Evaluator** → Result Collection
//!
//! # Architecture Overview
//!
//! ```text
//! Expression String
//!      |
//!   Lexer -> Tokens
//!      |
//!   Parser -> AST
//!      |
//! Compiler (+ ConstantTable) -> HIR
//!      |
//! Evaluator (+ Context) -> Collection
//! ```
//!
//! # Example
//!
//! ```rust
//! use ferrum_fhirpath::{ConstantTable, Engine};
//! use serde_json::json;
//!
//! let engine = Engine::default();
//! let expr = engine.compile("name.where(use = 'official').given.join(' ')", &ConstantTable::new())?;
//! let result = engine.evaluate_json(&expr, json!({
//!     "resourceType": "Patient",
//!     "name": [{"use": "official", "given": ["Jane", "Q"]}]
//! }))?;
//! assert_eq!(result.first().and_then(|v| v.as_str()), Some("Jane Q"));
//! # Ok::<(), ferrum_fhirpath::Error>(())
//! ```

pub mod ast;
pub mod compiler;
pub mod constants;
pub mod context;
pub mod conversion;
pub mod engine;
pub mod error;
mod evaluator;
pub mod functions;
pub mod hir;
pub mod lexer;
pub mod options;
pub mod parser;
mod temporal;
pub mod terminology;
pub mod token;
pub mod value;

// Re-export main types
pub use constants::{ConstantTable, ConstantValue};
pub use context::Context;
pub use conversion::ToJson;
pub use engine::{Engine, Expression};
pub use error::{Error, Result};
pub use options::{EvalOptions, GetIdStrategy, TemporalPrecision};
pub use terminology::{StaticValueSets, TerminologyError, TerminologyService};
pub use value::{Collection, Value, ValueData};
