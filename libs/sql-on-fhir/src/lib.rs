//! Tabular views over FHIR resources
//!
//! A view definition declares columns, nesting (`from`), unnesting
//! (`forEach`), constants and row filters (`where`). It is compiled once
//! into a [`ViewDefinition`] and then applied to any number of resources,
//! each producing zero or more [`Row`]s with the same ordered column set.
//!
//! ```text
//! view JSON --compile--> ViewDefinition --+
//!                                         |--generate--> Vec<Row> --RowEmitter--> records
//! resource JSON --------------------------+
//! ```
//!
//! # Example
//!
//! ```rust
//! use ferrum_fhirpath::Engine;
//! use ferrum_sof::{generate, JsonRowEmitter, RowEmitter, ViewDefinition};
//! use serde_json::json;
//!
//! let view = ViewDefinition::compile(&json!({
//!     "name": "patient_names",
//!     "resource": "Patient",
//!     "select": [
//!         {"name": "id", "expr": "id"},
//!         {"forEach": "name", "select": [{"name": "family", "expr": "family"}]}
//!     ]
//! }))?;
//!
//! let patient = json!({
//!     "resourceType": "Patient",
//!     "id": "p1",
//!     "name": [{"family": "Doe"}, {"family": "Roe"}]
//! });
//! let rows = generate(&view, &Engine::default(), &patient)?;
//! let records = JsonRowEmitter.emit_all(&rows);
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1]["family"], json!("Roe"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;
pub mod error;
pub mod generator;
pub mod names;
pub mod row;
pub mod runner;
pub mod view;

pub use error::{GenerateError, NameKind, Result, ViewError};
pub use generator::{generate, generate_shared};
pub use names::{is_valid_name, NAME_PATTERN};
pub use row::{Cell, JsonRowEmitter, Row, RowEmitter};
pub use runner::{ResourceOutcome, ViewRunner};
pub use view::{Column, SelectNode, ViewDefinition, WhereClause};
