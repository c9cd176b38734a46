use crate::error::Result;
use crate::value::Collection;

pub(super) fn first(input: &Collection) -> Result<Collection> {
    Ok(input
        .first()
        .cloned()
        .map(Collection::singleton)
        .unwrap_or_default())
}
