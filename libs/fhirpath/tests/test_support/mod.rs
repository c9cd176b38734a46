#![allow(dead_code)]

use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, OnceLock};

use ferrum_fhirpath::{Collection, ConstantTable, Context, Engine, Expression, StaticValueSets};

pub const VITALS_VALUE_SET: &str = "http://example.org/fhir/ValueSet/blood-pressure-codes";

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Engine with a small in-memory terminology service installed.
pub fn engine() -> &'static Engine {
    ENGINE.get_or_init(|| {
        let value_sets = StaticValueSets::new()
            .with_code(VITALS_VALUE_SET, Some("http://loinc.org"), "8480-6")
            .with_code(VITALS_VALUE_SET, Some("http://loinc.org"), "8462-4");
        Engine::default().with_terminology(Arc::new(value_sets))
    })
}

pub fn compile(expr: &str) -> Expression {
    engine()
        .compile(expr, &ConstantTable::new())
        .unwrap_or_else(|e| panic!("failed to compile '{}': {}", expr, e))
}

pub fn eval(expr: &str, resource: &JsonValue) -> Collection {
    let ctx = Context::from_json(Arc::new(resource.clone())).expect("resource");
    engine()
        .evaluate(&compile(expr), &ctx)
        .unwrap_or_else(|e| panic!("failed to evaluate '{}': {}", expr, e))
}

pub fn strings(collection: &Collection) -> Vec<String> {
    collection
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

pub fn patient() -> JsonValue {
    json!({
        "resourceType": "Patient",
        "id": "p1",
        "gender": "male",
        "birthDate": "1974-12-25",
        "extension": [{
            "url": "http://hl7.org/fhir/us/core/StructureDefinition/us-core-birthsex",
            "valueCode": "F"
        }],
        "name": [
            {"use": "official", "family": "Doe", "given": ["Jane", "Q"]},
            {"use": "nickname", "given": ["JJ"]}
        ],
        "managingOrganization": {"reference": "Organization/org-1"},
        "address": [
            {"use": "home", "city": "Berlin", "postalCode": "10115"},
            {"use": "work", "city": "Hamburg"}
        ]
    })
}

pub fn blood_pressure() -> JsonValue {
    json!({
        "resourceType": "Observation",
        "id": "bp-1",
        "status": "final",
        "subject": {"reference": "Patient/p1"},
        "effectiveDateTime": "2021-06-01T08:30:00Z",
        "code": {"coding": [{"system": "http://loinc.org", "code": "85354-9"}]},
        "component": [
            {
                "code": {"coding": [{"system": "http://loinc.org", "code": "8480-6"}]},
                "valueQuantity": {
                    "value": 120,
                    "unit": "mmHg",
                    "system": "http://unitsofmeasure.org",
                    "code": "mm[Hg]"
                }
            },
            {
                "code": {"coding": [{"system": "http://loinc.org", "code": "8462-4"}]},
                "valueQuantity": {
                    "value": 80,
                    "unit": "mmHg",
                    "system": "http://unitsofmeasure.org",
                    "code": "mm[Hg]"
                }
            }
        ]
    })
}
