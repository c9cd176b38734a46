//! Existence functions: exists(), empty(), not()

use crate::error::Result;
use crate::value::{Collection, Value};

pub(super) fn exists(input: &Collection) -> Result<Collection> {
    Ok(Collection::singleton(Value::boolean(!input.is_empty())))
}

pub(super) fn empty(input: &Collection) -> Result<Collection> {
    Ok(Collection::singleton(Value::boolean(input.is_empty())))
}

/// Boolean negation of a singleton. Empty stays empty.
pub(super) fn not(input: &Collection) -> Result<Collection> {
    Ok(match input.to_boolean("not()")? {
        Some(b) => Collection::singleton(Value::boolean(!b)),
        None => Collection::empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_existence() {
        let empty_input = Collection::empty();
        let one = Collection::singleton(Value::string("x"));

        assert_eq!(exists(&empty_input).unwrap(), Collection::singleton(Value::boolean(false)));
        assert_eq!(exists(&one).unwrap(), Collection::singleton(Value::boolean(true)));
        assert_eq!(empty(&empty_input).unwrap(), Collection::singleton(Value::boolean(true)));
    }

    #[test]
    fn test_not() {
        let t = Collection::singleton(Value::boolean(true));
        assert_eq!(not(&t).unwrap(), Collection::singleton(Value::boolean(false)));
        assert!(not(&Collection::empty()).unwrap().is_empty());

        let two: Collection = vec![Value::boolean(true), Value::boolean(false)].into_iter().collect();
        assert!(matches!(not(&two), Err(Error::Cardinality(_))));
    }
}
