//! Filtering functions: where(), ofType(), extension()

use crate::context::Context;
use crate::error::{Error, Result};
use crate::evaluator::navigation::navigate;
use crate::evaluator::Evaluator;
use crate::hir::HirNode;
use crate::value::Collection;

/// Keep items for which `criteria` is true. Empty or false drops the item;
/// a non-singleton criteria result is an error.
pub(super) fn where_function(
    evaluator: &Evaluator<'_>,
    input: Collection,
    criteria: &HirNode,
    ctx: &Context,
) -> Result<Collection> {
    let mut result = Collection::empty();
    for item in &input {
        let matched = evaluator
            .evaluate(criteria, &ctx.with_item(item.clone()))?
            .to_boolean("where() criteria")?;
        if matched == Some(true) {
            result.push(item.clone());
        }
    }
    Ok(result)
}

/// Keep items whose type is `type_name`.
///
/// Primitive and choice-resolved items carry a type; resources report
/// their `resourceType`. An element with neither has no type to test.
pub(super) fn of_type(input: &Collection, type_name: &str) -> Result<Collection> {
    let mut result = Collection::empty();
    for item in input {
        match item.type_name() {
            Some(actual) if actual.eq_ignore_ascii_case(type_name) => result.push(item.clone()),
            Some(_) => {}
            None => {
                return Err(Error::Evaluation(format!(
                    "ofType({}) applied to an element without type information",
                    type_name
                )))
            }
        }
    }
    Ok(result)
}

/// Extensions of the input items with the given `url`.
pub(super) fn extension(input: &Collection, url: &str) -> Collection {
    navigate(input, "extension")
        .iter()
        .filter(|ext| {
            ext.resolved_json()
                .and_then(|json| json.get("url"))
                .and_then(|u| u.as_str())
                == Some(url)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_of_type_on_primitives() {
        let input: Collection = vec![Value::string("a"), Value::integer(1), Value::string("b")]
            .into_iter()
            .collect();
        assert_eq!(of_type(&input, "string").unwrap().len(), 2);
        assert_eq!(of_type(&input, "Integer").unwrap().len(), 1);
        assert!(of_type(&input, "Quantity").unwrap().is_empty());
    }

    #[test]
    fn test_of_type_without_type_information() {
        let node = Value::from_json(json!({"code": "x"})).unwrap();
        let err = of_type(&Collection::singleton(node), "Coding");
        assert!(matches!(err, Err(Error::Evaluation(_))));
    }

    #[test]
    fn test_extension_by_url() {
        let patient = Value::from_json(json!({
            "resourceType": "Patient",
            "extension": [
                {"url": "http://example.org/race", "valueString": "x"},
                {"url": "http://example.org/birthsex", "valueCode": "F"}
            ]
        }))
        .unwrap();
        let found = extension(&Collection::singleton(patient), "http://example.org/birthsex");
        assert_eq!(found.len(), 1);
        assert!(extension(&found, "http://example.org/none").is_empty());
    }
}
