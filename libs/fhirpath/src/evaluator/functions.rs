//! Function dispatch
//!
//! Each function receives its input collection and the still-unevaluated
//! argument nodes. Predicates (`where`, `exists`) evaluate their argument
//! per item; all other arguments evaluate once against the outer context.

mod existence;
mod filtering;
pub(super) mod quantity;
mod reference;
mod string;
mod subsetting;
mod terminology;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hir::{Function, HirNode};
use crate::value::Collection;

use super::Evaluator;

pub(super) fn execute_function(
    evaluator: &Evaluator<'_>,
    function: Function,
    input: Collection,
    args: &[HirNode],
    ctx: &Context,
) -> Result<Collection> {
    match function {
        Function::Where => filtering::where_function(evaluator, input, arg(args, 0, "where")?, ctx),
        Function::Exists => match args.first() {
            Some(criteria) => existence::exists(&filtering::where_function(
                evaluator, input, criteria, ctx,
            )?),
            None => existence::exists(&input),
        },
        Function::Empty => existence::empty(&input),
        Function::Not => existence::not(&input),
        Function::First => subsetting::first(&input),
        Function::OfType => {
            let type_name = string_arg(evaluator, args, 0, "ofType", ctx)?;
            filtering::of_type(&input, &type_name)
        }
        Function::Join => {
            let separator = match args.first() {
                Some(_) => string_arg(evaluator, args, 0, "join", ctx)?,
                None => String::new(),
            };
            string::join(&input, &separator)
        }
        Function::Extension => {
            let url = string_arg(evaluator, args, 0, "extension", ctx)?;
            Ok(filtering::extension(&input, &url))
        }
        Function::GetId => {
            let type_filter = match args.first() {
                Some(_) => Some(string_arg(evaluator, args, 0, "getId", ctx)?),
                None => None,
            };
            Ok(reference::get_id(
                &input,
                type_filter.as_deref(),
                evaluator.engine().options().get_id,
            ))
        }
        Function::MemberOf => {
            let value_set = string_arg(evaluator, args, 0, "memberOf", ctx)?;
            terminology::member_of(&input, &value_set, evaluator.engine().terminology())
        }
        Function::ToQuantity => {
            let unit = string_arg(evaluator, args, 0, "toQuantity", ctx)?;
            quantity::to_quantity(&input, &unit)
        }
    }
}

fn arg<'h>(args: &'h [HirNode], index: usize, function: &str) -> Result<&'h HirNode> {
    args.get(index).ok_or_else(|| {
        Error::Evaluation(format!("{}() is missing argument {}", function, index + 1))
    })
}

/// Evaluate an argument that must be a single string.
fn string_arg(
    evaluator: &Evaluator<'_>,
    args: &[HirNode],
    index: usize,
    function: &str,
    ctx: &Context,
) -> Result<String> {
    let value = evaluator.evaluate(arg(args, index, function)?, ctx)?;
    let what = format!("{}() argument", function);
    match value.singleton_item(&what)? {
        Some(item) => item.as_str().map(str::to_string).ok_or_else(|| {
            Error::Evaluation(format!(
                "{} must be a string, got {}",
                what,
                item.type_name().unwrap_or("object")
            ))
        }),
        None => Err(Error::Evaluation(format!("{} evaluated to empty", what))),
    }
}
