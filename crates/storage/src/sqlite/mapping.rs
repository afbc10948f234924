use quiz_core::model::CountryCode;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Encode codes as a JSON array, preserving order.
pub(crate) fn encode_codes(codes: &[CountryCode]) -> Result<String, StorageError> {
    serde_json::to_string(codes).map_err(ser)
}

/// Decode a JSON array of codes. Any invalid code fails the whole value.
pub(crate) fn decode_codes(raw: &str) -> Result<Vec<CountryCode>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}
