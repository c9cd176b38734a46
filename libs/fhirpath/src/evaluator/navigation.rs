//! Member navigation over JSON-backed items
//!
//! Polymorphic elements are stored as `<name><Type>` (`valueQuantity`,
//! `effectiveDateTime`). Navigating `value` on such a node picks the present
//! variant and tags the result with its type for `ofType()`.

use phf::phf_set;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::context::Context;
use crate::conversion::UCUM_SYSTEM;
use crate::temporal::{parse_date_value, parse_datetime_value};
use crate::value::{Collection, JsonPath, JsonPathToken, Value, ValueData};

/// Primitive type names, spelled the way they appear as type tags.
static PRIMITIVE_TYPES: phf::Set<&'static str> = phf_set! {
    "base64Binary", "boolean", "canonical", "code", "date", "dateTime",
    "decimal", "id", "instant", "integer", "integer64", "markdown", "oid",
    "positiveInt", "string", "time", "unsignedInt", "uri", "url", "uuid",
};

/// Complex data types a choice element can carry.
static COMPLEX_TYPES: phf::Set<&'static str> = phf_set! {
    "Address", "Age", "Annotation", "Attachment", "CodeableConcept",
    "CodeableReference", "Coding", "ContactDetail", "ContactPoint",
    "Contributor", "Count", "DataRequirement", "Distance", "Dosage",
    "Duration", "Expression", "HumanName", "Identifier", "Meta", "Money",
    "ParameterDefinition", "Period", "Quantity", "Range", "Ratio",
    "RatioRange", "Reference", "RelatedArtifact", "SampledData", "Signature",
    "Timing", "TriggerDefinition", "UsageContext",
};

/// Navigate `name` from the current focus. A leading step naming a
/// resource type (`Patient.id`) selects the focus items of that type, or
/// the root resource when the focus is something else.
pub(super) fn navigate_from_focus(ctx: &Context, name: &str) -> Collection {
    if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        let typed: Collection = ctx
            .this
            .iter()
            .filter(|item| item.resource_type() == Some(name))
            .cloned()
            .collect();
        if !typed.is_empty() {
            return typed;
        }
        if ctx.resource.resource_type() == Some(name) {
            return Collection::singleton(ctx.resource.clone());
        }
    }
    navigate(&ctx.this, name)
}

pub(super) fn navigate(input: &Collection, name: &str) -> Collection {
    let mut result = Collection::empty();
    for item in input {
        navigate_item(item, name, &mut result);
    }
    result
}

fn navigate_item(item: &Value, name: &str, out: &mut Collection) {
    match item.data() {
        ValueData::Node { root, path } => {
            let Some(JsonValue::Object(obj)) = item.resolved_json() else {
                return;
            };

            if let Some(child) = obj.get(name) {
                push_children(root, path, name, child, None, out);
                return;
            }

            for (key, child) in obj {
                if let Some(suffix) = choice_suffix(key, name) {
                    let tag = choice_type_tag(suffix);
                    push_children(root, path, key, child, Some(tag), out);
                    break;
                }
            }
        }
        ValueData::Quantity { value, unit } => match name {
            "value" => out.push(Value::decimal(*value)),
            "unit" | "code" => out.push(Value::string(unit.clone())),
            "system" => out.push(Value::string(UCUM_SYSTEM)),
            _ => {}
        },
        _ => {}
    }
}

/// `Quantity` for `valueQuantity` when navigating `value`. The suffix must
/// name a data type, so `classHistory` is not a variant of `class`.
fn choice_suffix<'k>(key: &'k str, base: &str) -> Option<&'k str> {
    let suffix = key.strip_prefix(base)?;
    if !suffix.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    (COMPLEX_TYPES.contains(suffix) || PRIMITIVE_TYPES.contains(lower_first(suffix).as_str()))
        .then_some(suffix)
}

fn lower_first(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Primitive suffixes become lower camel case (`DateTime` to `dateTime`),
/// complex types keep their name.
fn choice_type_tag(suffix: &str) -> Arc<str> {
    let lowered = lower_first(suffix);
    if PRIMITIVE_TYPES.contains(lowered.as_str()) {
        Arc::from(lowered)
    } else {
        Arc::from(suffix)
    }
}

fn push_children(
    root: &Arc<JsonValue>,
    base: &JsonPath,
    key: &str,
    child: &JsonValue,
    tag: Option<Arc<str>>,
    out: &mut Collection,
) {
    let mut path = base.clone();
    path.push(JsonPathToken::Key(Arc::from(key)));

    match child {
        JsonValue::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let mut item_path = path.clone();
                item_path.push(JsonPathToken::Index(idx));
                push_item(root, item_path, item, tag.clone(), out);
            }
        }
        other => push_item(root, path, other, tag, out),
    }
}

fn push_item(
    root: &Arc<JsonValue>,
    path: JsonPath,
    node: &JsonValue,
    tag: Option<Arc<str>>,
    out: &mut Collection,
) {
    let Some(value) = Value::from_json_node(root.clone(), path, node) else {
        return;
    };
    let Some(tag) = tag else {
        out.push(value);
        return;
    };

    // temporal choice values become real dates so comparisons honor precision
    let parsed = match (tag.as_ref(), node.as_str()) {
        ("date", Some(text)) => parse_date_value(text),
        ("dateTime" | "instant", Some(text)) => parse_datetime_value(text),
        _ => None,
    };
    out.push(parsed.unwrap_or(value).with_type_tag(tag));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(json: JsonValue) -> Context {
        Context::from_json(Arc::new(json)).expect("resource")
    }

    #[test]
    fn test_arrays_flatten_in_order() {
        let ctx = resource(json!({
            "resourceType": "Patient",
            "name": [{"given": ["A", "B"]}, {"given": ["C"]}, {"family": "X"}]
        }));
        let names = navigate_from_focus(&ctx, "name");
        let given = navigate(&names, "given");
        let texts: Vec<_> = given.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_null_and_missing_are_empty() {
        let ctx = resource(json!({"resourceType": "Patient", "gender": null}));
        assert!(navigate_from_focus(&ctx, "gender").is_empty());
        assert!(navigate_from_focus(&ctx, "birthDate").is_empty());
    }

    #[test]
    fn test_choice_resolution_tags_type() {
        let ctx = resource(json!({
            "resourceType": "Observation",
            "valueQuantity": {"value": 120, "unit": "mm[Hg]"},
            "effectiveDateTime": "2021-06-01T08:30:00Z"
        }));
        let value = navigate_from_focus(&ctx, "value");
        assert_eq!(value.len(), 1);
        assert_eq!(value.first().unwrap().type_tag(), Some("Quantity"));

        let effective = navigate_from_focus(&ctx, "effective");
        let item = effective.first().unwrap();
        assert_eq!(item.type_tag(), Some("dateTime"));
        assert!(matches!(item.data(), ValueData::DateTime { .. }));
    }

    #[test]
    fn test_resource_type_step() {
        let ctx = resource(json!({"resourceType": "Patient", "id": "p1"}));
        let patient = navigate_from_focus(&ctx, "Patient");
        assert_eq!(navigate(&patient, "id").first().and_then(|v| v.as_str()), Some("p1"));

        let inner = ctx.with_focus(navigate_from_focus(&ctx, "name"));
        assert_eq!(navigate_from_focus(&inner, "Patient").len(), 1);
        assert!(navigate_from_focus(&ctx, "Observation").is_empty());
    }

    #[test]
    fn test_choice_type_tags() {
        assert_eq!(choice_type_tag("DateTime").as_ref(), "dateTime");
        assert_eq!(choice_type_tag("String").as_ref(), "string");
        assert_eq!(choice_type_tag("CodeableConcept").as_ref(), "CodeableConcept");
        assert_eq!(choice_suffix("valueQuantity", "value"), Some("Quantity"));
        assert_eq!(choice_suffix("valueset", "value"), None);
        assert_eq!(choice_suffix("value", "value"), None);
        assert_eq!(choice_suffix("effectiveDateTime", "effective"), Some("DateTime"));
        assert_eq!(choice_suffix("statusReason", "status"), None);
        assert_eq!(choice_suffix("detailSequence", "detail"), None);
    }

    #[test]
    fn test_sibling_with_longer_name_is_not_a_choice() {
        let ctx = resource(json!({
            "resourceType": "Encounter",
            "classHistory": [{"class": {"code": "AMB"}}]
        }));
        assert!(navigate_from_focus(&ctx, "class").is_empty());
        assert_eq!(navigate_from_focus(&ctx, "classHistory").len(), 1);
    }
}
