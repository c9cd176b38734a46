//! Property-based tests using QuickCheck

use quickcheck::{QuickCheck, TestResult};
use serde_json::json;
use std::sync::Arc;

use ferrum_fhirpath::{Collection, ConstantTable, Context, Engine, Value};

fn empty_patient() -> Context {
    Context::from_json(Arc::new(json!({"resourceType": "Patient"}))).expect("resource")
}

/// Property: Addition is commutative for integers
#[test]
fn prop_addition_commutative() {
    fn prop(a: i32, b: i32) -> bool {
        let engine = Engine::default();
        let ctx = empty_patient();

        let left = engine.evaluate_expr(&format!("{} + {}", a, b), &ctx).unwrap();
        let right = engine.evaluate_expr(&format!("{} + {}", b, a), &ctx).unwrap();
        left == right && left == Collection::singleton(Value::integer(i64::from(a) + i64::from(b)))
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i32, i32) -> bool);
}

/// Property: escaped string literals evaluate to the original text
#[test]
fn prop_string_literal_round_trip() {
    fn prop(s: String) -> TestResult {
        let engine = Engine::default();
        let ctx = empty_patient();

        // Escape backslashes first, then single quotes
        let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
        let expr = format!("'{}'", escaped);

        match engine.evaluate_expr(&expr, &ctx) {
            Ok(result) => TestResult::from_bool(
                result.first().and_then(|v| v.as_str()) == Some(s.as_str()),
            ),
            Err(_) => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String) -> TestResult);
}

/// Property: compiling the same text twice gives equal expressions
#[test]
fn prop_compilation_is_deterministic() {
    fn prop(segments: Vec<u8>) -> TestResult {
        if segments.is_empty() {
            return TestResult::discard();
        }
        const NAMES: [&str; 6] = ["name", "given", "code", "coding", "value", "component"];
        let path = segments
            .iter()
            .map(|i| NAMES[*i as usize % NAMES.len()])
            .collect::<Vec<_>>()
            .join(".");
        let expr = format!("{}.where($this.exists()).first()", path);

        let engine = Engine::default();
        let constants = ConstantTable::new();
        match (engine.compile(&expr, &constants), engine.compile(&expr, &constants)) {
            (Ok(a), Ok(b)) => TestResult::from_bool(a == b),
            _ => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

/// Property: navigation never invents items; `exists()` and `empty()`
/// always disagree
#[test]
fn prop_exists_is_not_empty() {
    fn prop(given: Vec<String>) -> bool {
        let engine = Engine::default();
        let resource = json!({"resourceType": "Patient", "name": [{"given": given}]});
        let ctx = Context::from_json(Arc::new(resource)).expect("resource");

        let count = engine.evaluate_expr("name.given", &ctx).unwrap().len();
        let exists = engine.evaluate_expr("name.given.exists()", &ctx).unwrap();
        let empty = engine.evaluate_expr("name.given.empty()", &ctx).unwrap();

        count == given.len()
            && exists.first().and_then(|v| v.as_bool()) == Some(!given.is_empty())
            && empty.first().and_then(|v| v.as_bool()) == Some(given.is_empty())
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<String>) -> bool);
}
