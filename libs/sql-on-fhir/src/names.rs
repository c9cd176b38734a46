//! Identifier rule for view, column and constant names

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{NameKind, Result, ViewError};

pub const NAME_PATTERN: &str = "^[^_][A-Za-z0-9_]+$";

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("name regex must compile"))
}

pub fn is_valid_name(name: &str) -> bool {
    name_regex().is_match(name)
}

pub(crate) fn validate(name: &str, kind: NameKind, path: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ViewError::NameValidation {
            path: path.to_string(),
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rule() {
        for valid in ["id", "given_name", "sbp_quantity_value", "a1", "Patient2"] {
            assert!(is_valid_name(valid), "{}", valid);
        }
        for invalid in ["", "a", "_id", "given name", "family-name"] {
            assert!(!is_valid_name(invalid), "{}", invalid);
        }
    }

    #[test]
    fn test_leading_character_is_not_restricted_to_letters() {
        // only an underscore is excluded as the first character
        assert!(is_valid_name("1st"));
        assert!(is_valid_name("-x"));
    }

    #[test]
    fn test_validate_reports_kind_and_path() {
        let err = validate("_bad", NameKind::Column, "select[0]").unwrap_err();
        assert_eq!(
            err,
            ViewError::NameValidation {
                path: "select[0]".into(),
                kind: NameKind::Column,
                name: "_bad".into()
            }
        );
    }
}
