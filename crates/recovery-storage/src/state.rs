use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;
use crate::objects;

/// Load a JSON document. Returns the deserialized value and its ETag.
pub fn load_state<T: DeserializeOwned>(root: &Path, key: &str) -> Result<(T, String), StorageError> {
    let output = objects::get_object(root, key)?;
    let value: T = serde_json::from_slice(&output.body)?;
    Ok((value, output.etag))
}

/// Load a JSON document if it exists.
pub fn load_state_opt<T: DeserializeOwned>(
    root: &Path,
    key: &str,
) -> Result<Option<(T, String)>, StorageError> {
    match objects::get_object_opt(root, key)? {
        Some(output) => {
            let value: T = serde_json::from_slice(&output.body)?;
            Ok(Some((value, output.etag)))
        }
        None => Ok(None),
    }
}

/// Save a JSON document. Returns the new ETag.
pub fn save_state<T: Serialize>(root: &Path, key: &str, value: &T) -> Result<String, StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    objects::put_object(root, key, body)
}

/// Save a JSON document with ETag optimistic locking.
pub fn save_state_if_match<T: Serialize>(
    root: &Path,
    key: &str,
    value: &T,
    expected_etag: Option<&str>,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    objects::put_object_if_match(root, key, body, expected_etag)
}
