//! Function registry
//!
//! Maps function names to [`Function`] and their argument bounds, using a
//! compile-time perfect hash map (phf) for lookups.

use crate::hir::Function;
use phf::phf_map;

/// Function metadata
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata {
    pub function: Function,
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

impl FunctionMetadata {
    /// Human readable arity, used in error messages.
    pub fn arity(&self) -> String {
        if self.min_args == self.max_args {
            format!("{}", self.min_args)
        } else {
            format!("{} to {}", self.min_args, self.max_args)
        }
    }
}

/// Functions recognized at compile time.
static FUNCTIONS_BY_NAME: phf::Map<&'static str, FunctionMetadata> = phf_map! {
    // Existence
    "empty" => FunctionMetadata { function: Function::Empty, name: "empty", min_args: 0, max_args: 0 },
    "exists" => FunctionMetadata { function: Function::Exists, name: "exists", min_args: 0, max_args: 1 },
    "not" => FunctionMetadata { function: Function::Not, name: "not", min_args: 0, max_args: 0 },

    // Filtering and subsetting
    "where" => FunctionMetadata { function: Function::Where, name: "where", min_args: 1, max_args: 1 },
    "ofType" => FunctionMetadata { function: Function::OfType, name: "ofType", min_args: 1, max_args: 1 },
    "extension" => FunctionMetadata { function: Function::Extension, name: "extension", min_args: 1, max_args: 1 },
    "first" => FunctionMetadata { function: Function::First, name: "first", min_args: 0, max_args: 0 },

    // Strings
    "join" => FunctionMetadata { function: Function::Join, name: "join", min_args: 0, max_args: 1 },

    // References, terminology and quantities
    "getId" => FunctionMetadata { function: Function::GetId, name: "getId", min_args: 0, max_args: 1 },
    "memberOf" => FunctionMetadata { function: Function::MemberOf, name: "memberOf", min_args: 1, max_args: 1 },
    "toQuantity" => FunctionMetadata { function: Function::ToQuantity, name: "toQuantity", min_args: 1, max_args: 1 },
};

/// Look up a function by name.
pub fn lookup(name: &str) -> Option<&'static FunctionMetadata> {
    FUNCTIONS_BY_NAME.get(name)
}

/// All registered function names, sorted.
pub fn function_names() -> Vec<&'static str> {
    let mut names: Vec<_> = FUNCTIONS_BY_NAME.keys().copied().collect();
    names.sort_unstable();
    names
}
