//! Date/dateTime parsing and precision-aware comparison

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use std::cmp::Ordering;

use crate::options::TemporalPrecision;
use crate::value::{DatePrecision, DateTimePrecision, Value, ValueData};

pub(crate) fn parse_date_value(input: &str) -> Option<Value> {
    let s = input.trim();
    let (date, precision) = match s.len() {
        4 => (
            NaiveDate::parse_from_str(&format!("{}-01-01", s), "%Y-%m-%d").ok()?,
            DatePrecision::Year,
        ),
        7 => (
            NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()?,
            DatePrecision::Month,
        ),
        10 => (
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?,
            DatePrecision::Day,
        ),
        _ => return None,
    };
    Some(Value::date(date, precision))
}

/// Parse a dateTime (or instant). Date-only input becomes a dateTime with
/// date precision and no zone.
pub(crate) fn parse_datetime_value(input: &str) -> Option<Value> {
    let raw = input.trim();

    let Some((date_part, rest)) = raw.split_once('T') else {
        let (value, precision) = match parse_date_value(raw)?.data() {
            ValueData::Date { value, precision } => (*value, *precision),
            _ => return None,
        };
        let midnight = NaiveDateTime::new(value, NaiveTime::from_hms_opt(0, 0, 0)?);
        return Some(Value::datetime(
            DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc),
            precision.into(),
            None,
        ));
    };

    let date = match parse_date_value(date_part)?.data() {
        ValueData::Date { value, .. } => *value,
        _ => return None,
    };

    let (time_part, tz_offset) = parse_timezone(rest)?;
    let (time, precision) = parse_time_of_day(time_part)?;

    let local = NaiveDateTime::new(date, time);
    let utc = match tz_offset {
        Some(offset_secs) => FixedOffset::east_opt(offset_secs)?
            .from_local_datetime(&local)
            .single()?
            .with_timezone(&Utc),
        None => DateTime::<Utc>::from_naive_utc_and_offset(local, Utc),
    };

    Some(Value::datetime(utc, precision, tz_offset))
}

/// Parse a string as the temporal kind of `like`, for mixed comparisons such
/// as a tagged `dateTime` against a string constant.
pub(crate) fn parse_like(input: &str, like: &Value) -> Option<Value> {
    match like.data() {
        ValueData::Date { .. } if !input.contains('T') => parse_date_value(input),
        ValueData::Date { .. } | ValueData::DateTime { .. } => parse_datetime_value(input),
        _ => None,
    }
}

fn parse_timezone(rest: &str) -> Option<(&str, Option<i32>)> {
    if let Some(stripped) = rest.strip_suffix('Z') {
        return Some((stripped, Some(0)));
    }

    if let Some(pos) = rest.rfind(['+', '-']) {
        let (time, tz) = rest.split_at(pos);
        if tz.len() == 6 && tz.as_bytes()[3] == b':' {
            let sign = if tz.starts_with('-') { -1 } else { 1 };
            let hours: i32 = tz[1..3].parse().ok()?;
            let minutes: i32 = tz[4..6].parse().ok()?;
            return Some((time, Some(sign * (hours * 3600 + minutes * 60))));
        }
        return None;
    }

    Some((rest, None))
}

fn parse_time_of_day(time_part: &str) -> Option<(NaiveTime, DateTimePrecision)> {
    if time_part.is_empty() {
        return Some((NaiveTime::from_hms_opt(0, 0, 0)?, DateTimePrecision::Day));
    }

    let (main, frac) = match time_part.split_once('.') {
        Some((main, frac)) => (main, Some(frac)),
        None => (time_part, None),
    };

    let parts: Vec<&str> = main.split(':').collect();
    let (hour, minute, second, precision) = match parts.as_slice() {
        [hh] => (*hh, "0", "0", DateTimePrecision::Hour),
        [hh, mm] => (*hh, *mm, "0", DateTimePrecision::Minute),
        [hh, mm, ss] if frac.is_some() => (*hh, *mm, *ss, DateTimePrecision::Millisecond),
        [hh, mm, ss] => (*hh, *mm, *ss, DateTimePrecision::Second),
        _ => return None,
    };

    let nanos = match frac {
        Some(frac) => {
            let digits: String = frac.chars().take(3).collect();
            format!("{:0<3}", digits).parse::<u32>().ok()? * 1_000_000
        }
        None => 0,
    };

    let time = NaiveTime::from_hms_nano_opt(
        hour.parse().ok()?,
        minute.parse().ok()?,
        second.parse().ok()?,
        nanos,
    )?;
    Some((time, precision))
}

/// A date or dateTime item viewed as a point with a precision.
struct Instant {
    value: DateTime<Utc>,
    offset: Option<i32>,
    precision: DateTimePrecision,
}

impl Instant {
    fn of(value: &Value) -> Option<Self> {
        match value.data() {
            ValueData::Date { value, precision } => Some(Self {
                value: DateTime::<Utc>::from_naive_utc_and_offset(
                    value.and_hms_opt(0, 0, 0)?,
                    Utc,
                ),
                offset: None,
                precision: (*precision).into(),
            }),
            ValueData::DateTime {
                value,
                precision,
                timezone_offset,
            } => Some(Self {
                value: *value,
                offset: *timezone_offset,
                precision: *precision,
            }),
            _ => None,
        }
    }

    /// Calendar fields down to `precision`. Day-level fields are read in the
    /// item's own zone, finer fields in UTC.
    fn fields(&self, precision: DateTimePrecision) -> Vec<u32> {
        let local = match self.offset {
            Some(secs) if precision <= DateTimePrecision::Day => FixedOffset::east_opt(secs)
                .map(|offset| self.value.with_timezone(&offset).naive_local())
                .unwrap_or_else(|| self.value.naive_utc()),
            _ => self.value.naive_utc(),
        };
        let all = [
            local.year() as u32,
            local.month(),
            local.day(),
            local.hour(),
            local.minute(),
            local.second(),
            local.nanosecond() / 1_000_000,
        ];
        let keep = precision as usize + 1;
        all[..keep].to_vec()
    }
}

fn normalized(precision: DateTimePrecision) -> DateTimePrecision {
    // seconds and milliseconds compare as one precision
    if precision == DateTimePrecision::Millisecond {
        DateTimePrecision::Second
    } else {
        precision
    }
}

/// Order two temporal items. `None` when either is not temporal, or when
/// the answer depends on digits one side does not have (strict policy).
pub(crate) fn compare(left: &Value, right: &Value, policy: TemporalPrecision) -> Option<Ordering> {
    let left = Instant::of(left)?;
    let right = Instant::of(right)?;

    let (lp, rp) = (normalized(left.precision), normalized(right.precision));
    if lp == rp {
        return Some(if lp == DateTimePrecision::Second {
            left.value.cmp(&right.value)
        } else {
            left.fields(lp).cmp(&right.fields(lp))
        });
    }

    let common = lp.min(rp);
    match left.fields(common).cmp(&right.fields(common)) {
        Ordering::Equal => match policy {
            TemporalPrecision::Strict => None,
            TemporalPrecision::Truncate => Some(Ordering::Equal),
        },
        ordering => Some(ordering),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> Value {
        parse_datetime_value(s).expect("parse failed")
    }

    #[test]
    fn test_parse_precisions() {
        assert!(matches!(
            parse_date_value("2020-02").unwrap().data(),
            ValueData::Date {
                precision: DatePrecision::Month,
                ..
            }
        ));
        assert!(parse_date_value("2020-13-01").is_none());

        let cases = [
            ("2020", DateTimePrecision::Year),
            ("2020-02-03", DateTimePrecision::Day),
            ("2020-02-03T10:00", DateTimePrecision::Minute),
            ("2020-02-03T10:00:01Z", DateTimePrecision::Second),
            ("2020-02-03T10:00:01.25+02:00", DateTimePrecision::Millisecond),
        ];
        for (input, expected) in cases {
            match dt(input).data() {
                ValueData::DateTime { precision, .. } => assert_eq!(*precision, expected, "{}", input),
                other => panic!("expected dateTime for {}, got {:?}", input, other),
            }
        }
        assert!(parse_datetime_value("2020-02-03T10:00+0200").is_none());
    }

    #[test]
    fn test_offsets_normalize_to_utc() {
        assert_eq!(
            compare(
                &dt("2020-01-01T10:00:00+02:00"),
                &dt("2020-01-01T08:00:00Z"),
                TemporalPrecision::Strict
            ),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_mixed_precision_policies() {
        let day = dt("2020-01-01");
        let later_same_day = dt("2020-01-01T10:00:00Z");
        let next_day = dt("2020-01-02T00:30:00Z");

        assert_eq!(compare(&day, &later_same_day, TemporalPrecision::Strict), None);
        assert_eq!(
            compare(&day, &later_same_day, TemporalPrecision::Truncate),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare(&day, &next_day, TemporalPrecision::Strict),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_date_against_datetime() {
        let date = parse_date_value("2019-05").unwrap();
        assert_eq!(
            compare(&date, &dt("2020-01-01"), TemporalPrecision::Strict),
            Some(Ordering::Less)
        );
        assert_eq!(compare(&date, &Value::integer(1), TemporalPrecision::Strict), None);
    }
}
