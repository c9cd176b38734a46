//! Row generation
//!
//! Generation walks the compiled select tree once per resource. Each step
//! threads a list of partial rows: a column fills a cell in every partial
//! row, `from` narrows the focus, and `forEach` replaces each partial row
//! by one copy per item of its parent expression. Where clauses are
//! checked against the root once the walk is done.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

use ferrum_fhirpath::{Collection, Context, Engine, Expression};

use crate::error::GenerateError;
use crate::row::{Cell, Row};
use crate::view::{SelectNode, ViewDefinition};

type PartialRow = HashMap<Arc<str>, Cell>;

/// Generate the rows of `view` for one resource.
///
/// Resources of another type produce no rows.
pub fn generate(
    view: &ViewDefinition,
    engine: &Engine,
    resource: &JsonValue,
) -> Result<Vec<Row>, GenerateError> {
    generate_shared(view, engine, Arc::new(resource.clone()))
}

/// Like [`generate`], for a resource that is already shared.
pub fn generate_shared(
    view: &ViewDefinition,
    engine: &Engine,
    resource: Arc<JsonValue>,
) -> Result<Vec<Row>, GenerateError> {
    let resource_type = resource.get("resourceType").and_then(JsonValue::as_str);
    if resource_type != Some(view.resource()) {
        tracing::debug!(
            view = view.name(),
            expected = view.resource(),
            found = resource_type.unwrap_or("<none>"),
            "skipping resource of another type"
        );
        return Ok(Vec::new());
    }

    let ctx = Context::from_json(resource).map_err(|e| GenerateError::new("$", e))?;
    GenerationRun::new(view, engine).execute(&ctx)
}

/// State for a single resource.
struct GenerationRun<'a> {
    view: &'a ViewDefinition,
    engine: &'a Engine,
}

impl<'a> GenerationRun<'a> {
    fn new(view: &'a ViewDefinition, engine: &'a Engine) -> Self {
        Self { view, engine }
    }

    fn execute(&self, root: &Context) -> Result<Vec<Row>, GenerateError> {
        let partials = self.walk(self.view.select(), root, vec![PartialRow::new()], "select")?;

        for (idx, clause) in self.view.where_clauses().iter().enumerate() {
            let keep = self
                .evaluate(&clause.expression, root)
                .and_then(|result| result.to_boolean("where clause"))
                .map_err(|e| GenerateError::new(format!("where[{}]", idx), e))?;
            if keep != Some(true) {
                return Ok(Vec::new());
            }
        }

        Ok(partials.into_iter().map(|partial| self.finish(partial)).collect())
    }

    fn walk(
        &self,
        nodes: &[SelectNode],
        ctx: &Context,
        mut partials: Vec<PartialRow>,
        prefix: &str,
    ) -> Result<Vec<PartialRow>, GenerateError> {
        for (idx, node) in nodes.iter().enumerate() {
            if partials.is_empty() {
                break;
            }
            partials = match node {
                SelectNode::Column(column) => {
                    let cell = self
                        .evaluate(&column.expression, ctx)
                        .map(|result| Cell::from_collection(&result))
                        .map_err(|e| GenerateError::new(format!("{}[{}]", prefix, idx), e))?;
                    for partial in partials.iter_mut() {
                        partial.insert(column.name.clone(), cell.clone());
                    }
                    partials
                }
                SelectNode::From { expression, select } => {
                    let focus = self
                        .evaluate(expression, ctx)
                        .map_err(|e| GenerateError::new(format!("{}[{}].from", prefix, idx), e))?;
                    let child_prefix = format!("{}[{}].select", prefix, idx);
                    self.walk(select, &ctx.with_focus(focus), partials, &child_prefix)?
                }
                SelectNode::ForEach { expression, select } => {
                    let items = self
                        .evaluate(expression, ctx)
                        .map_err(|e| GenerateError::new(format!("{}[{}].forEach", prefix, idx), e))?;
                    let child_prefix = format!("{}[{}].select", prefix, idx);
                    let mut expanded = Vec::with_capacity(partials.len() * items.len());
                    for partial in &partials {
                        for item in items.iter() {
                            let item_ctx = ctx.with_item(item.clone());
                            expanded.extend(self.walk(
                                select,
                                &item_ctx,
                                vec![partial.clone()],
                                &child_prefix,
                            )?);
                        }
                    }
                    expanded
                }
            };
        }
        Ok(partials)
    }

    fn evaluate(&self, expression: &Expression, ctx: &Context) -> ferrum_fhirpath::Result<Collection> {
        self.engine.evaluate(expression, ctx)
    }

    /// Lay the cells out in schema order.
    fn finish(&self, mut partial: PartialRow) -> Row {
        Row::new(
            self.view
                .columns()
                .iter()
                .map(|name| {
                    let cell = partial.remove(name).unwrap_or(Cell::Null);
                    (name.clone(), cell)
                })
                .collect(),
        )
    }
}
