//! toQuantity() and UCUM unit conversion
//!
//! Only the units that show up in vital signs and common lab results are
//! known. Every unit maps to a factor against the base unit of its
//! dimension; temperatures are affine and go through kelvin.

use rust_decimal::Decimal;

use crate::error::Result;
use crate::value::{Collection, Value, ValueData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Mass,
    Length,
    Pressure,
    Time,
    Volume,
    Temperature,
}

/// Dimension and factor to the base unit (g, m, Pa, s, L).
fn unit_factor(unit: &str) -> Option<(Dimension, Decimal)> {
    let entry = match unit {
        "g" => (Dimension::Mass, Decimal::ONE),
        "kg" => (Dimension::Mass, Decimal::from(1000)),
        "mg" => (Dimension::Mass, Decimal::new(1, 3)),
        "ug" => (Dimension::Mass, Decimal::new(1, 6)),
        "[lb_av]" => (Dimension::Mass, Decimal::new(45_359_237, 5)),
        "[oz_av]" => (Dimension::Mass, Decimal::new(28_349_523_125, 9)),

        "m" => (Dimension::Length, Decimal::ONE),
        "km" => (Dimension::Length, Decimal::from(1000)),
        "cm" => (Dimension::Length, Decimal::new(1, 2)),
        "mm" => (Dimension::Length, Decimal::new(1, 3)),
        "[in_i]" => (Dimension::Length, Decimal::new(254, 4)),
        "[ft_i]" => (Dimension::Length, Decimal::new(3048, 4)),

        "Pa" => (Dimension::Pressure, Decimal::ONE),
        "kPa" => (Dimension::Pressure, Decimal::from(1000)),
        "bar" => (Dimension::Pressure, Decimal::from(100_000)),
        "mm[Hg]" => (Dimension::Pressure, Decimal::new(133_322_387_415, 9)),
        "cm[H2O]" => (Dimension::Pressure, Decimal::new(980_665, 4)),

        "ms" => (Dimension::Time, Decimal::new(1, 3)),
        "s" => (Dimension::Time, Decimal::ONE),
        "min" => (Dimension::Time, Decimal::from(60)),
        "h" => (Dimension::Time, Decimal::from(3600)),
        "d" => (Dimension::Time, Decimal::from(86_400)),
        "wk" => (Dimension::Time, Decimal::from(604_800)),

        "L" => (Dimension::Volume, Decimal::ONE),
        "dL" => (Dimension::Volume, Decimal::new(1, 1)),
        "mL" => (Dimension::Volume, Decimal::new(1, 3)),
        "uL" => (Dimension::Volume, Decimal::new(1, 6)),

        "K" | "Cel" | "[degF]" => (Dimension::Temperature, Decimal::ONE),
        _ => return None,
    };
    Some(entry)
}

fn to_kelvin(value: Decimal, unit: &str) -> Option<Decimal> {
    let zero_celsius = Decimal::new(27_315, 2);
    match unit {
        "K" => Some(value),
        "Cel" => value.checked_add(zero_celsius),
        "[degF]" => (value - Decimal::from(32))
            .checked_mul(Decimal::from(5))?
            .checked_div(Decimal::from(9))?
            .checked_add(zero_celsius),
        _ => None,
    }
}

fn from_kelvin(kelvin: Decimal, unit: &str) -> Option<Decimal> {
    let zero_celsius = Decimal::new(27_315, 2);
    match unit {
        "K" => Some(kelvin),
        "Cel" => kelvin.checked_sub(zero_celsius),
        "[degF]" => (kelvin - zero_celsius)
            .checked_mul(Decimal::from(9))?
            .checked_div(Decimal::from(5))?
            .checked_add(Decimal::from(32)),
        _ => None,
    }
}

/// Convert `value` from one UCUM unit to another. `None` for unknown
/// units or units of different dimensions.
pub(crate) fn convert_quantity(value: Decimal, from: &str, to: &str) -> Option<Decimal> {
    if from == to {
        return Some(value);
    }
    let (from_dim, from_factor) = unit_factor(from)?;
    let (to_dim, to_factor) = unit_factor(to)?;
    if from_dim != to_dim {
        return None;
    }

    let converted = if from_dim == Dimension::Temperature {
        from_kelvin(to_kelvin(value, from)?, to)?
    } else {
        value.checked_mul(from_factor)?.checked_div(to_factor)?
    };
    Some(converted.normalize())
}

/// toQuantity(unit) on a singleton Quantity node or quantity value.
/// Unknown or incompatible units give empty.
pub(super) fn to_quantity(input: &Collection, unit: &str) -> Result<Collection> {
    let Some(item) = input.singleton_item("toQuantity()")? else {
        return Ok(Collection::empty());
    };
    let Some((value, from)) = quantity_parts(item) else {
        return Ok(Collection::empty());
    };
    Ok(convert_quantity(value, &from, unit)
        .map(|converted| Collection::singleton(Value::quantity(converted, unit)))
        .unwrap_or_default())
}

/// Value and UCUM code of a quantity item. Nodes prefer `code` over the
/// display `unit`.
fn quantity_parts(item: &Value) -> Option<(Decimal, String)> {
    if let ValueData::Quantity { value, unit } = item.data() {
        return Some((*value, unit.to_string()));
    }
    let json = item.resolved_json()?;
    let value = match json.get("value")? {
        serde_json::Value::Number(n) => crate::value::decimal_from_json_number(n)?,
        _ => return None,
    };
    let unit = json
        .get("code")
        .or_else(|| json.get("unit"))
        .and_then(|u| u.as_str())?;
    Some((value, unit.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_within_dimension() {
        assert_eq!(convert_quantity(Decimal::from(2), "kg", "g"), Some(Decimal::from(2000)));
        assert_eq!(
            convert_quantity(Decimal::from(150), "kPa", "Pa"),
            Some(Decimal::from(150_000))
        );
        assert_eq!(convert_quantity(Decimal::from(90), "min", "h"), Some(Decimal::new(15, 1)));
    }

    #[test]
    fn test_temperature_is_affine() {
        assert_eq!(convert_quantity(Decimal::from(100), "Cel", "[degF]"), Some(Decimal::from(212)));
        assert_eq!(convert_quantity(Decimal::ZERO, "Cel", "K"), Some(Decimal::new(27_315, 2)));
    }

    #[test]
    fn test_incompatible_units() {
        assert_eq!(convert_quantity(Decimal::ONE, "kg", "m"), None);
        assert_eq!(convert_quantity(Decimal::ONE, "furlong", "m"), None);
    }

    #[test]
    fn test_to_quantity_on_node() {
        let bp = Value::from_json(json!({
            "value": 120,
            "unit": "mmHg",
            "system": "http://unitsofmeasure.org",
            "code": "mm[Hg]"
        }))
        .unwrap();
        let result = to_quantity(&Collection::singleton(bp.clone()), "mm[Hg]").unwrap();
        assert_eq!(result, Collection::singleton(Value::quantity(Decimal::from(120), "mm[Hg]")));

        assert!(to_quantity(&Collection::singleton(bp), "kg").unwrap().is_empty());
    }
}
