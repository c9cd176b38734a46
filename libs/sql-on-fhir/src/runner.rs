//! Batch row generation for one view

use serde_json::Value as JsonValue;
use std::sync::Arc;

use ferrum_fhirpath::Engine;

use crate::error::GenerateError;
use crate::generator::generate_shared;
use crate::row::Row;
use crate::view::ViewDefinition;

/// Result of one resource in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOutcome {
    /// Position of the resource in the input.
    pub index: usize,
    pub resource_id: Option<String>,
    pub result: Result<Vec<Row>, GenerateError>,
}

impl ResourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Rows, or an empty slice when the resource failed.
    pub fn rows(&self) -> &[Row] {
        self.result.as_deref().unwrap_or(&[])
    }
}

/// A compiled view bound to an engine. Cheap to clone and share between
/// threads.
#[derive(Debug, Clone)]
pub struct ViewRunner {
    view: Arc<ViewDefinition>,
    engine: Arc<Engine>,
}

impl ViewRunner {
    pub fn new(view: Arc<ViewDefinition>, engine: Arc<Engine>) -> Self {
        Self { view, engine }
    }

    /// Runner with default engine options.
    pub fn from_view(view: ViewDefinition) -> Self {
        Self::new(Arc::new(view), Arc::new(Engine::default()))
    }

    pub fn view(&self) -> &ViewDefinition {
        &self.view
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn run(&self, resource: &JsonValue) -> Result<Vec<Row>, GenerateError> {
        generate_shared(&self.view, &self.engine, Arc::new(resource.clone()))
    }

    /// Run every resource. A failing resource never stops the batch; its
    /// outcome carries the error instead.
    pub fn run_batch(&self, resources: &[JsonValue]) -> Vec<ResourceOutcome> {
        resources
            .iter()
            .enumerate()
            .map(|(index, resource)| self.run_one(index, resource))
            .collect()
    }

    fn run_one(&self, index: usize, resource: &JsonValue) -> ResourceOutcome {
        let resource_id = resource
            .get("id")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let result = self.run(resource);

        if let Err(e) = &result {
            tracing::warn!(
                view = self.view.name(),
                index,
                resource_id = resource_id.as_deref().unwrap_or("<none>"),
                error = %e,
                "row generation failed"
            );
        }

        ResourceOutcome {
            index,
            resource_id,
            result,
        }
    }
}
