use crate::error::{Error, Result};
use crate::terminology::TerminologyService;
use crate::value::{Collection, Value};

/// memberOf(valueSet) on a singleton code, Coding or CodeableConcept.
pub(super) fn member_of(
    input: &Collection,
    value_set: &str,
    service: Option<&dyn TerminologyService>,
) -> Result<Collection> {
    let Some(item) = input.singleton_item("memberOf()")? else {
        return Ok(Collection::empty());
    };
    let service = service.ok_or_else(|| {
        Error::TerminologyUnavailable(format!(
            "memberOf('{}') needs a terminology service",
            value_set
        ))
    })?;
    let member = service
        .member_of(item, value_set)
        .map_err(|e| Error::TerminologyUnavailable(e.to_string()))?;
    Ok(Collection::singleton(Value::boolean(member)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminology::StaticValueSets;
    use serde_json::json;

    const VS: &str = "http://example.org/ValueSet/vitals";

    #[test]
    fn test_member_of() {
        let sets = StaticValueSets::new().with_code(VS, Some("http://loinc.org"), "8480-6");
        let coding = Value::from_json(json!({"system": "http://loinc.org", "code": "8480-6"})).unwrap();

        let result = member_of(&Collection::singleton(coding), VS, Some(&sets)).unwrap();
        assert_eq!(result, Collection::singleton(Value::boolean(true)));
        assert!(member_of(&Collection::empty(), VS, Some(&sets)).unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_service() {
        let code = Collection::singleton(Value::string("x"));
        assert!(matches!(
            member_of(&code, VS, None),
            Err(Error::TerminologyUnavailable(_))
        ));

        let sets = StaticValueSets::new();
        assert!(matches!(
            member_of(&code, VS, Some(&sets)),
            Err(Error::TerminologyUnavailable(_))
        ));
    }
}
