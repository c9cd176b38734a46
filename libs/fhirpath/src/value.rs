//! Value representation for expression evaluation
//!
//! Values are cheap to clone: item data lives behind an `Arc`, and nested
//! objects of a resource are not copied out of the JSON tree but referenced
//! by a path from the shared root (`ValueData::Node`).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use smallvec::SmallVec;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// One step from a JSON root down to a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsonPathToken {
    Key(Arc<str>),
    Index(usize),
}

pub type JsonPath = SmallVec<[JsonPathToken; 4]>;

fn resolve_json_at<'a>(mut current: &'a JsonValue, path: &[JsonPathToken]) -> Option<&'a JsonValue> {
    for token in path {
        match token {
            JsonPathToken::Key(key) => {
                current = current.as_object()?.get(key.as_ref())?;
            }
            JsonPathToken::Index(idx) => {
                current = current.as_array()?.get(*idx)?;
            }
        }
    }
    Some(current)
}

/// Date precision levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatePrecision {
    Year,  // 2014
    Month, // 2014-01
    Day,   // 2014-01-01
}

/// DateTime precision levels, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateTimePrecision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl From<DatePrecision> for DateTimePrecision {
    fn from(precision: DatePrecision) -> Self {
        match precision {
            DatePrecision::Year => DateTimePrecision::Year,
            DatePrecision::Month => DateTimePrecision::Month,
            DatePrecision::Day => DateTimePrecision::Day,
        }
    }
}

/// Internal value data representation
#[derive(Debug, Clone)]
pub enum ValueData {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(Arc<str>),
    Date {
        value: NaiveDate,
        precision: DatePrecision,
    },
    DateTime {
        value: DateTime<Utc>,
        precision: DateTimePrecision,
        /// Offset in seconds east of UTC; `None` when the source had no zone.
        timezone_offset: Option<i32>,
    },
    /// Quantity produced by unit conversion. `unit` is a UCUM code.
    Quantity { value: Decimal, unit: Arc<str> },
    /// Object inside a shared JSON tree. Navigation extends `path` without
    /// cloning JSON.
    Node { root: Arc<JsonValue>, path: JsonPath },
}

/// A single item of a collection
#[derive(Clone, Debug)]
pub struct Value {
    data: Arc<ValueData>,
    /// Declared type, set when a choice element (`value[x]`) is resolved.
    type_tag: Option<Arc<str>>,
}

impl Value {
    fn new(data: ValueData) -> Self {
        Self {
            data: Arc::new(data),
            type_tag: None,
        }
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    pub fn with_type_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(ValueData::Boolean(b))
    }

    pub fn integer(i: i64) -> Self {
        Self::new(ValueData::Integer(i))
    }

    pub fn decimal(d: Decimal) -> Self {
        Self::new(ValueData::Decimal(d))
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Self::new(ValueData::String(s.into()))
    }

    pub fn date(value: NaiveDate, precision: DatePrecision) -> Self {
        Self::new(ValueData::Date { value, precision })
    }

    pub fn datetime(
        value: DateTime<Utc>,
        precision: DateTimePrecision,
        timezone_offset: Option<i32>,
    ) -> Self {
        Self::new(ValueData::DateTime {
            value,
            precision,
            timezone_offset,
        })
    }

    pub fn quantity(value: Decimal, unit: impl Into<Arc<str>>) -> Self {
        Self::new(ValueData::Quantity {
            value,
            unit: unit.into(),
        })
    }

    /// Wrap a whole resource. Non-object JSON yields a primitive item, and
    /// `null`/arrays yield `None`.
    pub fn from_json(json: JsonValue) -> Option<Self> {
        Self::from_json_root(Arc::new(json))
    }

    pub fn from_json_root(root: Arc<JsonValue>) -> Option<Self> {
        Self::from_json_node(root.clone(), JsonPath::new(), root.as_ref())
    }

    /// Build the item for `node`, found at `path` under `root`.
    pub(crate) fn from_json_node(root: Arc<JsonValue>, path: JsonPath, node: &JsonValue) -> Option<Self> {
        match node {
            JsonValue::Null | JsonValue::Array(_) => None,
            JsonValue::Bool(b) => Some(Self::boolean(*b)),
            JsonValue::Number(n) => Some(match n.as_i64() {
                Some(i) => Self::integer(i),
                None => Self::decimal(decimal_from_json_number(n)?),
            }),
            JsonValue::String(s) => Some(Self::string(s.as_str())),
            JsonValue::Object(_) => Some(Self::new(ValueData::Node { root, path })),
        }
    }

    /// The JSON this item refers to, for nodes.
    pub fn resolved_json(&self) -> Option<&JsonValue> {
        match self.data() {
            ValueData::Node { root, path } => resolve_json_at(root.as_ref(), path),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.data() {
            ValueData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data() {
            ValueData::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.data(), ValueData::Node { .. })
    }

    /// `resourceType` of a node item.
    pub fn resource_type(&self) -> Option<&str> {
        self.resolved_json()?.get("resourceType")?.as_str()
    }

    /// Type of the item: the declared tag if any, else inferred from the
    /// value kind. Nodes without a tag report their `resourceType`.
    pub fn type_name(&self) -> Option<&str> {
        if let Some(tag) = self.type_tag() {
            return Some(tag);
        }
        match self.data() {
            ValueData::Boolean(_) => Some("boolean"),
            ValueData::Integer(_) => Some("integer"),
            ValueData::Decimal(_) => Some("decimal"),
            ValueData::String(_) => Some("string"),
            ValueData::Date { .. } => Some("date"),
            ValueData::DateTime { .. } => Some("dateTime"),
            ValueData::Quantity { .. } => Some("Quantity"),
            ValueData::Node { .. } => self.resource_type(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.type_tag != other.type_tag {
            return false;
        }
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        match (self.data(), other.data()) {
            (ValueData::Boolean(l), ValueData::Boolean(r)) => l == r,
            (ValueData::Integer(l), ValueData::Integer(r)) => l == r,
            (ValueData::Decimal(l), ValueData::Decimal(r)) => l == r,
            (ValueData::String(l), ValueData::String(r)) => l == r,
            (
                ValueData::Date {
                    value: lv,
                    precision: lp,
                },
                ValueData::Date {
                    value: rv,
                    precision: rp,
                },
            ) => lv == rv && lp == rp,
            (
                ValueData::DateTime {
                    value: lv,
                    precision: lp,
                    timezone_offset: lt,
                },
                ValueData::DateTime {
                    value: rv,
                    precision: rp,
                    timezone_offset: rt,
                },
            ) => lv == rv && lp == rp && lt == rt,
            (
                ValueData::Quantity {
                    value: lv,
                    unit: lu,
                },
                ValueData::Quantity {
                    value: rv,
                    unit: ru,
                },
            ) => lv == rv && lu == ru,
            (ValueData::Node { root: lr, path: lp }, ValueData::Node { root: rr, path: rp }) => {
                (Arc::ptr_eq(lr, rr) && lp == rp) || self.resolved_json() == other.resolved_json()
            }
            _ => false,
        }
    }
}

/// JSON numbers keep their textual digits, so `120.0` stays `120.0`.
pub(crate) fn decimal_from_json_number(n: &serde_json::Number) -> Option<Decimal> {
    Decimal::from_str(&n.to_string())
        .or_else(|_| Decimal::from_scientific(&n.to_string()))
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain))
}

/// Collections with more than this many items are shared behind an `Arc`.
const COLLECTION_ARC_THRESHOLD: usize = 4;

/// Ordered sequence of items. Empty is the absence of a value.
///
/// Small collections (the common case) are stored inline; larger ones are
/// wrapped in an `Arc` so cloning stays O(1).
#[derive(Clone, Debug)]
pub struct Collection {
    inner: CollectionInner,
}

#[derive(Clone, Debug)]
enum CollectionInner {
    Small(SmallVec<[Value; 4]>),
    Large(Arc<SmallVec<[Value; 4]>>),
}

impl Default for Collection {
    fn default() -> Self {
        Self::empty()
    }
}

impl Collection {
    pub fn empty() -> Self {
        Self {
            inner: CollectionInner::Small(SmallVec::new()),
        }
    }

    pub fn singleton(value: Value) -> Self {
        let mut inner = SmallVec::new();
        inner.push(value);
        Self {
            inner: CollectionInner::Small(inner),
        }
    }

    fn get_mut(&mut self) -> &mut SmallVec<[Value; 4]> {
        if let CollectionInner::Large(arc) = &mut self.inner {
            let vec = std::mem::take(Arc::make_mut(arc));
            self.inner = CollectionInner::Small(vec);
        }
        match &mut self.inner {
            CollectionInner::Small(vec) => vec,
            CollectionInner::Large(_) => unreachable!("converted to Small above"),
        }
    }

    fn ensure_representation(&mut self) {
        if let CollectionInner::Small(vec) = &mut self.inner {
            if vec.len() > COLLECTION_ARC_THRESHOLD {
                let vec = std::mem::take(vec);
                self.inner = CollectionInner::Large(Arc::new(vec));
            }
        }
    }

    pub fn push(&mut self, value: Value) {
        self.get_mut().push(value);
        self.ensure_representation();
    }

    pub fn extend_from(&mut self, other: Collection) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        let vec = self.get_mut();
        vec.extend(other.iter().cloned());
        self.ensure_representation();
    }

    fn as_slice(&self) -> &[Value] {
        match &self.inner {
            CollectionInner::Small(vec) => vec.as_slice(),
            CollectionInner::Large(arc) => arc.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_slice().iter()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_slice().get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.as_slice().first()
    }

    /// The single item, `None` when empty. Several items are a cardinality
    /// error naming `what` needed the singleton.
    pub fn singleton_item(&self, what: &str) -> Result<Option<&Value>> {
        match self.as_slice() {
            [] => Ok(None),
            [item] => Ok(Some(item)),
            items => Err(Error::Cardinality(format!(
                "{} expects a single item, got {}",
                what,
                items.len()
            ))),
        }
    }

    /// Singleton evaluation as a boolean: empty is `None`, a boolean item
    /// is its value, any other single item counts as `true`.
    pub fn to_boolean(&self, what: &str) -> Result<Option<bool>> {
        Ok(self
            .singleton_item(what)?
            .map(|item| item.as_bool().unwrap_or(true)))
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut collection = Collection::empty();
        for value in iter {
            collection.push(value);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Value> for Collection {
    fn from(value: Value) -> Self {
        Collection::singleton(value)
    }
}
