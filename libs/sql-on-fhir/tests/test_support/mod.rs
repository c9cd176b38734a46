#![allow(dead_code)]

use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use ferrum_fhirpath::{Engine, Value};
use ferrum_sof::{Cell, Row, ViewDefinition, ViewRunner};

static ENGINE: OnceLock<Arc<Engine>> = OnceLock::new();

pub fn engine() -> Arc<Engine> {
    ENGINE.get_or_init(|| Arc::new(Engine::default())).clone()
}

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

pub fn load_fixture(relative: &str) -> JsonValue {
    let path = fixture_path(relative);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON in {}: {}", path.display(), e))
}

pub fn load_view(name: &str) -> ViewDefinition {
    let document = load_fixture(&format!("views/{}.json", name));
    ViewDefinition::compile(&document).unwrap_or_else(|e| panic!("failed to compile {}: {}", name, e))
}

pub fn runner(name: &str) -> ViewRunner {
    ViewRunner::new(Arc::new(load_view(name)), engine())
}

pub fn patient() -> JsonValue {
    load_fixture("resources/patient.json")
}

pub fn blood_pressure() -> JsonValue {
    load_fixture("resources/blood_pressure.json")
}

pub fn scalar<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column).and_then(Cell::as_scalar)
}

pub fn text(row: &Row, column: &str) -> Option<String> {
    scalar(row, column).and_then(|v| v.as_str()).map(str::to_string)
}
