//! Conversion of values back to JSON

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value as JsonValue};

use crate::value::{Collection, DatePrecision, DateTimePrecision, Value, ValueData};

pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

pub trait ToJson {
    fn to_json(&self) -> JsonValue;
}

impl ToJson for Value {
    fn to_json(&self) -> JsonValue {
        match self.data() {
            ValueData::Boolean(b) => JsonValue::Bool(*b),
            ValueData::Integer(i) => JsonValue::from(*i),
            ValueData::Decimal(d) => decimal_to_json(d),
            ValueData::String(s) => JsonValue::String(s.to_string()),
            ValueData::Date { value, precision } => {
                JsonValue::String(format_date_value(*value, *precision))
            }
            ValueData::DateTime {
                value,
                precision,
                timezone_offset,
            } => JsonValue::String(format_datetime_value(value, *precision, *timezone_offset)),
            ValueData::Quantity { value, unit } => {
                let mut map = Map::new();
                map.insert("value".into(), decimal_to_json(value));
                map.insert("unit".into(), JsonValue::String(unit.to_string()));
                map.insert("system".into(), JsonValue::String(UCUM_SYSTEM.into()));
                map.insert("code".into(), JsonValue::String(unit.to_string()));
                JsonValue::Object(map)
            }
            ValueData::Node { .. } => self.resolved_json().cloned().unwrap_or(JsonValue::Null),
        }
    }
}

/// Empty becomes `null`, a singleton its item, anything longer an array.
impl ToJson for Collection {
    fn to_json(&self) -> JsonValue {
        match self.len() {
            0 => JsonValue::Null,
            1 => self.iter().next().map(ToJson::to_json).unwrap_or(JsonValue::Null),
            _ => JsonValue::Array(self.iter().map(ToJson::to_json).collect()),
        }
    }
}

/// Whole decimals stay integral when they fit; others go through `f64`
/// unless that would lose the value entirely, in which case they are kept
/// as strings.
fn decimal_to_json(d: &Decimal) -> JsonValue {
    if d.fract().is_zero() && d.scale() == 0 {
        if let Some(i) = d.to_i64() {
            return JsonValue::from(i);
        }
    }
    match d.to_f64().and_then(Number::from_f64) {
        Some(n) => JsonValue::Number(n),
        None => JsonValue::String(d.to_string()),
    }
}

pub fn format_date_value(value: NaiveDate, precision: DatePrecision) -> String {
    match precision {
        DatePrecision::Year => value.format("%Y").to_string(),
        DatePrecision::Month => value.format("%Y-%m").to_string(),
        DatePrecision::Day => value.format("%Y-%m-%d").to_string(),
    }
}

pub fn format_datetime_value(
    value: &DateTime<Utc>,
    precision: DateTimePrecision,
    timezone_offset: Option<i32>,
) -> String {
    let format = match precision {
        DateTimePrecision::Year => "%Y",
        DateTimePrecision::Month => "%Y-%m",
        DateTimePrecision::Day => "%Y-%m-%d",
        DateTimePrecision::Hour => "%Y-%m-%dT%H",
        DateTimePrecision::Minute => "%Y-%m-%dT%H:%M",
        DateTimePrecision::Second => "%Y-%m-%dT%H:%M:%S",
        DateTimePrecision::Millisecond => "%Y-%m-%dT%H:%M:%S%.3f",
    };

    match timezone_offset.and_then(FixedOffset::east_opt) {
        Some(offset) if precision >= DateTimePrecision::Hour => format!(
            "{}{}",
            value.with_timezone(&offset).format(format),
            format_offset(offset.local_minus_utc())
        ),
        _ => value.naive_utc().format(format).to_string(),
    }
}

pub fn format_offset(offset_seconds: i32) -> String {
    if offset_seconds == 0 {
        return "Z".to_string();
    }

    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    let total_minutes = offset_seconds.abs() / 60;
    format!("{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}
