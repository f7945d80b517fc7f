use serde::{Deserialize, Deserializer};

pub mod category;
pub mod document;
pub mod document_type;
pub mod employee;
pub mod matrix;

/// Records coming out of the entity store use `null` and "missing" interchangeably.
/// Fields that have a natural empty value deserialize both to that value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
