//! getId(): extract the id part of references

use crate::options::GetIdStrategy;
use crate::value::{Collection, Value};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A parsed reference: optional resource type and the logical id.
#[derive(Debug, PartialEq)]
struct ReferenceKey<'a> {
    resource_type: Option<&'a str>,
    id: &'a str,
}

/// Ids of the references in `input`. Items may be Reference nodes or
/// reference strings. With `type_filter`, references to other resource
/// types are dropped.
pub(super) fn get_id(input: &Collection, type_filter: Option<&str>, strategy: GetIdStrategy) -> Collection {
    let mut result = Collection::empty();
    for item in input {
        let Some(reference) = reference_string(item) else {
            continue;
        };
        let Some(key) = parse_reference(reference) else {
            continue;
        };
        if let Some(expected) = type_filter {
            if key.resource_type != Some(expected) {
                continue;
            }
        }
        result.push(Value::string(render(&key, strategy)));
    }
    result
}

fn reference_string(item: &Value) -> Option<&str> {
    if let Some(s) = item.as_str() {
        return Some(s);
    }
    item.resolved_json()?.get("reference")?.as_str()
}

/// `Patient/123`, `http://host/fhir/Patient/123/_history/2`,
/// `urn:uuid:...` and `#contained` are all understood.
fn parse_reference(reference: &str) -> Option<ReferenceKey<'_>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    for prefix in ["urn:uuid:", "urn:oid:", "#"] {
        if let Some(id) = reference.strip_prefix(prefix) {
            return (!id.is_empty()).then_some(ReferenceKey {
                resource_type: None,
                id,
            });
        }
    }

    let segments: Vec<&str> = reference.split('/').filter(|s| !s.is_empty()).collect();
    let end = segments
        .iter()
        .position(|s| *s == "_history")
        .unwrap_or(segments.len());
    let segments = &segments[..end];

    let id = *segments.last()?;
    let resource_type = segments
        .len()
        .checked_sub(2)
        .map(|idx| segments[idx])
        .filter(|s| s.starts_with(|c: char| c.is_ascii_uppercase()));

    Some(ReferenceKey { resource_type, id })
}

fn render(key: &ReferenceKey<'_>, strategy: GetIdStrategy) -> String {
    let qualified = || match key.resource_type {
        Some(resource_type) => format!("{}/{}", resource_type, key.id),
        None => key.id.to_string(),
    };
    match strategy {
        GetIdStrategy::LastSegment => key.id.to_string(),
        GetIdStrategy::TypeAndId => qualified(),
        GetIdStrategy::Hash => hex::encode(fnv1a(qualified().as_bytes()).to_be_bytes()),
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
