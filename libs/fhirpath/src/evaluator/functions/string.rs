//! String functions

use crate::error::{Error, Result};
use crate::value::{Collection, Value};

/// Concatenate string items with `separator`. Empty input gives empty.
pub(super) fn join(input: &Collection, separator: &str) -> Result<Collection> {
    if input.is_empty() {
        return Ok(Collection::empty());
    }

    let parts = input
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                Error::Evaluation(format!(
                    "join() expects strings, got {}",
                    item.type_name().unwrap_or("object")
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Collection::singleton(Value::string(parts.join(separator))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        let given: Collection = vec![Value::string("Jane"), Value::string("Q")].into_iter().collect();
        assert_eq!(join(&given, " ").unwrap(), Collection::singleton(Value::string("Jane Q")));
        assert_eq!(join(&given, "").unwrap(), Collection::singleton(Value::string("JaneQ")));
        assert!(join(&Collection::empty(), ",").unwrap().is_empty());

        let mixed: Collection = vec![Value::string("a"), Value::integer(1)].into_iter().collect();
        assert!(matches!(join(&mixed, ","), Err(Error::Evaluation(_))));
    }
}
