//! Operator implementations
//!
//! Operands of every binary operator are singletons. An empty operand makes
//! the result empty; more than one item is a cardinality error.

use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::hir::BinaryOperator;
use crate::options::EvalOptions;
use crate::temporal;
use crate::value::{Collection, Value, ValueData};

use super::functions::quantity::convert_quantity;

pub(super) fn execute_binary_op(
    op: BinaryOperator,
    left: &Collection,
    right: &Collection,
    options: &EvalOptions,
) -> Result<Collection> {
    let symbol = op.symbol();
    let left = left.singleton_item(&format!("left operand of '{}'", symbol))?;
    let right = right.singleton_item(&format!("right operand of '{}'", symbol))?;
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(Collection::empty());
    };

    let result = match op {
        BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div => {
            arithmetic(op, left, right)?
        }
        BinaryOperator::Eq => equals(left, right, options).map(Value::boolean),
        BinaryOperator::Ne => equals(left, right, options).map(|eq| Value::boolean(!eq)),
        BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => {
            compare(symbol, left, right, options)?.map(|ordering| {
                Value::boolean(match op {
                    BinaryOperator::Lt => ordering == Ordering::Less,
                    BinaryOperator::Le => ordering != Ordering::Greater,
                    BinaryOperator::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            })
        }
        BinaryOperator::And | BinaryOperator::Or => {
            let l = left.as_bool().unwrap_or(true);
            let r = right.as_bool().unwrap_or(true);
            return Ok(three_valued(op, Some(l), Some(r)));
        }
    };

    Ok(result.map(Collection::singleton).unwrap_or_default())
}

/// Three-valued `and`/`or` over already-evaluated operands.
pub(super) fn three_valued(op: BinaryOperator, left: Option<bool>, right: Option<bool>) -> Collection {
    let result = match op {
        BinaryOperator::And => match (left, right) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (left, right) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };
    result
        .map(|b| Collection::singleton(Value::boolean(b)))
        .unwrap_or_default()
}

pub(super) fn negate(operand: &Collection) -> Result<Collection> {
    let Some(item) = operand.singleton_item("unary '-'")? else {
        return Ok(Collection::empty());
    };
    let negated = match item.data() {
        ValueData::Integer(i) => Value::integer(
            i.checked_neg()
                .ok_or_else(|| Error::Evaluation("Integer overflow in unary '-'".into()))?,
        ),
        ValueData::Decimal(d) => Value::decimal(-*d),
        ValueData::Quantity { value, unit } => Value::quantity(-*value, unit.clone()),
        _ => {
            return Err(Error::Evaluation(format!(
                "Cannot negate {}",
                type_label(item)
            )))
        }
    };
    Ok(Collection::singleton(negated))
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i64),
    Decimal(Decimal),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value.data() {
            ValueData::Integer(i) => Some(Number::Integer(*i)),
            ValueData::Decimal(d) => Some(Number::Decimal(*d)),
            _ => None,
        }
    }

    fn to_decimal(self) -> Decimal {
        match self {
            Number::Integer(i) => Decimal::from(i),
            Number::Decimal(d) => d,
        }
    }
}

fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> Result<Option<Value>> {
    let symbol = op.symbol();
    let overflow = || Error::Evaluation(format!("Arithmetic overflow in '{}'", symbol));

    if let (ValueData::String(l), ValueData::String(r), BinaryOperator::Add) =
        (left.data(), right.data(), op)
    {
        return Ok(Some(Value::string(format!("{}{}", l, r))));
    }

    let (Some(l), Some(r)) = (Number::of(left), Number::of(right)) else {
        return Err(Error::Evaluation(format!(
            "Cannot apply '{}' to {} and {}",
            symbol,
            type_label(left),
            type_label(right)
        )));
    };

    if let (Number::Integer(l), Number::Integer(r)) = (l, r) {
        let result = match op {
            BinaryOperator::Add => l.checked_add(r),
            BinaryOperator::Sub => l.checked_sub(r),
            BinaryOperator::Mul => l.checked_mul(r),
            _ => return divide(Decimal::from(l), Decimal::from(r)),
        };
        return result.map(|i| Some(Value::integer(i))).ok_or_else(overflow);
    }

    let (l, r) = (l.to_decimal(), r.to_decimal());
    let result = match op {
        BinaryOperator::Add => l.checked_add(r),
        BinaryOperator::Sub => l.checked_sub(r),
        BinaryOperator::Mul => l.checked_mul(r),
        _ => return divide(l, r),
    };
    result.map(|d| Some(Value::decimal(d))).ok_or_else(overflow)
}

/// Division always yields a decimal; dividing by zero yields empty.
fn divide(left: Decimal, right: Decimal) -> Result<Option<Value>> {
    if right.is_zero() {
        return Ok(None);
    }
    left.checked_div(right)
        .map(|d| Some(Value::decimal(d.normalize())))
        .ok_or_else(|| Error::Evaluation("Arithmetic overflow in '/'".into()))
}

/// `None` when equality cannot be decided (temporal values of different
/// precision under the strict policy).
fn equals(left: &Value, right: &Value, options: &EvalOptions) -> Option<bool> {
    if let (Some(l), Some(r)) = (Number::of(left), Number::of(right)) {
        return Some(l.to_decimal() == r.to_decimal());
    }

    match (left.data(), right.data()) {
        (ValueData::Boolean(l), ValueData::Boolean(r)) => Some(l == r),
        (ValueData::String(l), ValueData::String(r)) => Some(l == r),
        (ValueData::Quantity { .. }, ValueData::Quantity { .. }) => {
            quantity_ordering(left, right).map(|o| o == Ordering::Equal).or(Some(false))
        }
        (ValueData::Node { .. }, ValueData::Node { .. }) => {
            Some(left.resolved_json() == right.resolved_json())
        }
        _ => match temporal_pair(left, right) {
            Some((l, r)) => temporal::compare(&l, &r, options.temporal_precision)
                .map(|o| o == Ordering::Equal),
            None => Some(false),
        },
    }
}

fn compare(
    symbol: &str,
    left: &Value,
    right: &Value,
    options: &EvalOptions,
) -> Result<Option<Ordering>> {
    if let (Some(l), Some(r)) = (Number::of(left), Number::of(right)) {
        return Ok(Some(l.to_decimal().cmp(&r.to_decimal())));
    }

    match (left.data(), right.data()) {
        (ValueData::String(l), ValueData::String(r)) => Ok(Some(l.cmp(r))),
        (ValueData::Quantity { .. }, ValueData::Quantity { .. }) => quantity_ordering(left, right)
            .map(Some)
            .ok_or_else(|| incomparable(symbol, left, right)),
        _ => match temporal_pair(left, right) {
            Some((l, r)) => Ok(temporal::compare(&l, &r, options.temporal_precision)),
            None => Err(incomparable(symbol, left, right)),
        },
    }
}

fn incomparable(symbol: &str, left: &Value, right: &Value) -> Error {
    Error::Evaluation(format!(
        "Cannot compare {} with {} using '{}'",
        type_label(left),
        type_label(right),
        symbol
    ))
}

fn is_temporal(value: &Value) -> bool {
    matches!(
        value.data(),
        ValueData::Date { .. } | ValueData::DateTime { .. }
    )
}

/// Both operands as temporal values. A string facing a date or dateTime is
/// parsed like its counterpart, so `effective > '2020-01-01'` works.
fn temporal_pair(left: &Value, right: &Value) -> Option<(Value, Value)> {
    match (is_temporal(left), is_temporal(right)) {
        (true, true) => Some((left.clone(), right.clone())),
        (true, false) => Some((left.clone(), temporal::parse_like(right.as_str()?, left)?)),
        (false, true) => Some((temporal::parse_like(left.as_str()?, right)?, right.clone())),
        (false, false) => None,
    }
}

/// Orders quantities after converting the right side into the left unit.
fn quantity_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    let (
        ValueData::Quantity { value: lv, unit: lu },
        ValueData::Quantity { value: rv, unit: ru },
    ) = (left.data(), right.data())
    else {
        return None;
    };
    let rv = if lu == ru {
        *rv
    } else {
        convert_quantity(*rv, ru, lu)?
    };
    Some(lv.cmp(&rv))
}

fn type_label(value: &Value) -> &str {
    value.type_name().unwrap_or("object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TemporalPrecision;
    use crate::temporal::parse_datetime_value;

    fn one(value: Value) -> Collection {
        Collection::singleton(value)
    }

    fn run(op: BinaryOperator, left: Value, right: Value) -> Result<Collection> {
        execute_binary_op(op, &one(left), &one(right), &EvalOptions::default())
    }

    #[test]
    fn test_empty_operand_gives_empty() {
        let result = execute_binary_op(
            BinaryOperator::Eq,
            &Collection::empty(),
            &one(Value::integer(1)),
            &EvalOptions::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_multiple_items_is_cardinality_error() {
        let many: Collection = vec![Value::integer(1), Value::integer(2)].into_iter().collect();
        let err = execute_binary_op(BinaryOperator::Eq, &many, &one(Value::integer(1)), &EvalOptions::default());
        assert!(matches!(err, Err(Error::Cardinality(_))));
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        let result = run(BinaryOperator::Eq, Value::integer(120), Value::decimal(Decimal::new(1200, 1))).unwrap();
        assert_eq!(result, one(Value::boolean(true)));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            run(BinaryOperator::Add, Value::integer(2), Value::integer(3)).unwrap(),
            one(Value::integer(5))
        );
        assert_eq!(
            run(BinaryOperator::Div, Value::integer(1), Value::integer(4)).unwrap(),
            one(Value::decimal(Decimal::new(25, 2)))
        );
        assert!(run(BinaryOperator::Div, Value::integer(1), Value::integer(0))
            .unwrap()
            .is_empty());
        assert_eq!(
            run(BinaryOperator::Add, Value::string("a"), Value::string("b")).unwrap(),
            one(Value::string("ab"))
        );
        assert!(matches!(
            run(BinaryOperator::Add, Value::integer(i64::MAX), Value::integer(1)),
            Err(Error::Evaluation(_))
        ));
        assert!(matches!(
            run(BinaryOperator::Mul, Value::string("a"), Value::integer(2)),
            Err(Error::Evaluation(_))
        ));
    }

    #[test]
    fn test_string_against_datetime() {
        let effective = parse_datetime_value("2021-06-01T08:30:00Z").unwrap();
        assert_eq!(
            run(BinaryOperator::Gt, effective.clone(), Value::string("2021-01-01T00:00:00Z")).unwrap(),
            one(Value::boolean(true))
        );
        assert_eq!(
            run(BinaryOperator::Eq, effective, Value::string("not a date")).unwrap(),
            one(Value::boolean(false))
        );
    }

    #[test]
    fn test_precision_policy() {
        let day = parse_datetime_value("2021-06-01").unwrap();
        let instant = parse_datetime_value("2021-06-01T08:30:00Z").unwrap();

        assert!(run(BinaryOperator::Eq, day.clone(), instant.clone()).unwrap().is_empty());

        let truncate = EvalOptions {
            temporal_precision: TemporalPrecision::Truncate,
            ..EvalOptions::default()
        };
        let result = execute_binary_op(BinaryOperator::Eq, &one(day), &one(instant), &truncate).unwrap();
        assert_eq!(result, one(Value::boolean(true)));
    }

    #[test]
    fn test_incomparable_types() {
        assert!(matches!(
            run(BinaryOperator::Lt, Value::boolean(true), Value::integer(1)),
            Err(Error::Evaluation(_))
        ));
        assert_eq!(
            run(BinaryOperator::Eq, Value::boolean(true), Value::integer(1)).unwrap(),
            one(Value::boolean(false))
        );
    }

    #[test]
    fn test_quantity_comparison_converts_units() {
        let kg = Value::quantity(Decimal::from(1), "kg");
        let g = Value::quantity(Decimal::from(500), "g");
        assert_eq!(run(BinaryOperator::Gt, kg, g).unwrap(), one(Value::boolean(true)));
    }

    #[test]
    fn test_three_valued_logic() {
        assert_eq!(three_valued(BinaryOperator::And, None, Some(false)), one(Value::boolean(false)));
        assert!(three_valued(BinaryOperator::And, None, Some(true)).is_empty());
        assert_eq!(three_valued(BinaryOperator::Or, None, Some(true)), one(Value::boolean(true)));
        assert!(three_valued(BinaryOperator::Or, Some(false), None).is_empty());
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&one(Value::integer(3))).unwrap(), one(Value::integer(-3)));
        assert!(negate(&Collection::empty()).unwrap().is_empty());
        assert!(negate(&one(Value::string("x"))).is_err());
    }
}
