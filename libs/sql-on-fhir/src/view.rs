//! Compiled view definitions
//!
//! A view compiles once, up front, and fails fast on the first problem.
//! The result is immutable and shared across any number of row
//! generations, from any number of threads.

use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use ferrum_fhirpath::{ConstantTable, ConstantValue, Engine, Expression, Value};

use crate::document::{read_node, required, RawConstant, RawSelect, RawView, RawWhere};
use crate::error::{NameKind, Result, ViewError};
use crate::names;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Arc<str>,
    pub expression: Expression,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectNode {
    Column(Column),
    /// Narrows the focus without changing the number of rows.
    From {
        expression: Expression,
        select: Vec<SelectNode>,
    },
    /// One row per item of `expression`.
    ForEach {
        expression: Expression,
        select: Vec<SelectNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub expression: Expression,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    name: String,
    description: Option<String>,
    resource: String,
    constants: ConstantTable,
    select: Vec<SelectNode>,
    where_clauses: Vec<WhereClause>,
    columns: Vec<Arc<str>>,
}

impl ViewDefinition {
    /// Compile a view definition document with default engine options.
    pub fn compile(document: &JsonValue) -> Result<Self> {
        Self::compile_with_engine(document, &Engine::default())
    }

    /// Compile using `engine` for expression parsing limits.
    pub fn compile_with_engine(document: &JsonValue, engine: &Engine) -> Result<Self> {
        let raw: RawView = read_node(document, "$")?;
        let mut builder = ViewBuilder {
            engine,
            constants: ConstantTable::new(),
            columns: Vec::new(),
            seen_columns: HashSet::new(),
        };

        let name = match raw.name.as_deref() {
            Some(name) => name,
            None => return Err(ViewError::structural("name", "missing 'name'")),
        };
        names::validate(name, NameKind::View, "name")?;
        let resource = required(&raw.resource, "resource", "resource")?.to_string();

        for (idx, node) in raw.constants.iter().enumerate() {
            builder.constant(node, &format!("constants[{}]", idx))?;
        }

        let select = builder.select_list(&raw.select, "select")?;
        if select.is_empty() {
            return Err(ViewError::structural("select", "a view needs at least one select entry"));
        }

        let where_clauses = raw
            .where_clauses
            .iter()
            .enumerate()
            .map(|(idx, node)| builder.where_clause(node, &format!("where[{}]", idx)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            view = name,
            resource = %resource,
            columns = builder.columns.len(),
            where_clauses = where_clauses.len(),
            "compiled view definition"
        );

        Ok(Self {
            name: name.to_string(),
            description: raw.desc,
            resource,
            constants: builder.constants,
            select,
            where_clauses,
            columns: builder.columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resource type the view applies to.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn select(&self) -> &[SelectNode] {
        &self.select
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    /// Column names in output order.
    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }
}

impl FromStr for ViewDefinition {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self> {
        let document: JsonValue =
            serde_json::from_str(s).map_err(|e| ViewError::InvalidJson(e.to_string()))?;
        Self::compile(&document)
    }
}

/// Compilation state: constants declared so far and the column schema.
struct ViewBuilder<'a> {
    engine: &'a Engine,
    constants: ConstantTable,
    columns: Vec<Arc<str>>,
    seen_columns: HashSet<Arc<str>>,
}

impl ViewBuilder<'_> {
    fn compile_expr(&self, expr: &str, path: &str) -> Result<Expression> {
        self.engine
            .compile(expr, &self.constants)
            .map_err(|source| ViewError::Expression {
                path: path.to_string(),
                source,
            })
    }

    /// Constants see only the constants declared before them.
    fn constant(&mut self, node: &JsonValue, path: &str) -> Result<()> {
        let raw: RawConstant = read_node(node, path)?;
        let name = raw
            .name
            .as_deref()
            .ok_or_else(|| ViewError::structural(path, "missing 'name'"))?;
        names::validate(name, NameKind::Constant, path)?;
        if self.constants.contains(name) {
            return Err(ViewError::structural(
                path,
                format!("duplicate constant '{}'", name),
            ));
        }

        let value = match (&raw.value, &raw.expr) {
            (Some(value), None) => ConstantValue::Literal(literal_constant(value, path)?),
            (None, Some(_)) => {
                let expr = required(&raw.expr, "expr", path)?;
                ConstantValue::Expression(self.compile_expr(expr, path)?.to_shared_hir())
            }
            _ => {
                return Err(ViewError::structural(
                    path,
                    "a constant needs exactly one of 'value' or 'expr'",
                ))
            }
        };

        self.constants.insert(name, value);
        Ok(())
    }

    fn select_list(&mut self, nodes: &[JsonValue], path: &str) -> Result<Vec<SelectNode>> {
        nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| self.select_node(node, &format!("{}[{}]", path, idx)))
            .collect()
    }

    fn select_node(&mut self, node: &JsonValue, path: &str) -> Result<SelectNode> {
        let raw: RawSelect = read_node(node, path)?;

        let is_column = raw.name.is_some() || raw.expr.is_some();
        let kinds = [is_column, raw.from.is_some(), raw.for_each.is_some()];
        if kinds.iter().filter(|present| **present).count() != 1 {
            return Err(ViewError::structural(
                path,
                "a select entry must be exactly one of a column (name/expr), 'from' or 'forEach'",
            ));
        }

        if is_column {
            return self.column(raw, path).map(SelectNode::Column);
        }

        if raw.desc.is_some() {
            return Err(ViewError::structural(path, "'desc' is only valid on columns"));
        }
        let children = match &raw.select {
            Some(children) if !children.is_empty() => children,
            _ => {
                return Err(ViewError::structural(
                    path,
                    "'from' and 'forEach' need a non-empty 'select'",
                ))
            }
        };

        let (key, text) = match &raw.from {
            Some(_) => ("from", &raw.from),
            None => ("forEach", &raw.for_each),
        };
        let expr_path = format!("{}.{}", path, key);
        let expression = self.compile_expr(required(text, key, &expr_path)?, &expr_path)?;
        let select = self.select_list(children, &format!("{}.select", path))?;

        Ok(if raw.from.is_some() {
            SelectNode::From { expression, select }
        } else {
            SelectNode::ForEach { expression, select }
        })
    }

    fn column(&mut self, raw: RawSelect, path: &str) -> Result<Column> {
        if raw.select.is_some() {
            return Err(ViewError::structural(path, "a column cannot have a nested 'select'"));
        }
        let name = raw
            .name
            .as_deref()
            .ok_or_else(|| ViewError::structural(path, "column is missing 'name'"))?;
        names::validate(name, NameKind::Column, path)?;
        let expr = required(&raw.expr, "expr", path)?;

        let name: Arc<str> = Arc::from(name);
        if !self.seen_columns.insert(name.clone()) {
            return Err(ViewError::structural(
                path,
                format!("duplicate column name '{}'", name),
            ));
        }

        let expression = self.compile_expr(expr, path)?;
        self.columns.push(name.clone());

        Ok(Column {
            name,
            expression,
            description: raw.desc,
        })
    }

    fn where_clause(&self, node: &JsonValue, path: &str) -> Result<WhereClause> {
        let raw: RawWhere = read_node(node, path)?;
        let expr = required(&raw.expr, "expr", path)?;
        Ok(WhereClause {
            expression: self.compile_expr(expr, path)?,
            description: raw.desc,
        })
    }
}

/// Literal constants are strings, numbers or booleans.
fn literal_constant(value: &JsonValue, path: &str) -> Result<Value> {
    match value {
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => Value::from_json(value.clone())
            .ok_or_else(|| ViewError::structural(path, "unrepresentable constant value")),
        _ => Err(ViewError::structural(
            path,
            "a constant value must be a string, number or boolean",
        )),
    }
}
