//! Raw document I/O under a root directory. Keys are `/`-separated relative
//! paths as produced by `recovery_core::store_keys`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use recovery_core::store_keys;

use crate::error::StorageError;

/// Result of a GET operation, including the body and ETag.
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: String,
}

/// Content hash used as the document's version token.
pub fn etag(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

/// Map a key onto a path under `root`. Every segment must be a plain file
/// or directory name, so no key can resolve outside the root.
fn object_path(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        if !store_keys::is_valid_segment(segment) {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        path.push(segment);
    }
    Ok(path)
}

/// Read a document.
pub fn get_object(root: &Path, key: &str) -> Result<GetObjectOutput, StorageError> {
    let body = fs::read(object_path(root, key)?).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StorageError::NotFound {
                key: key.to_string(),
            }
        } else {
            StorageError::Io(e)
        }
    })?;
    let etag = etag(&body);
    Ok(GetObjectOutput { body, etag })
}

/// Read a document, mapping a missing file to `None`.
pub fn get_object_opt(root: &Path, key: &str) -> Result<Option<GetObjectOutput>, StorageError> {
    match get_object(root, key) {
        Ok(output) => Ok(Some(output)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write a document. Returns the new ETag.
///
/// Writes go to a sibling temp file that is renamed into place, so readers
/// never observe a half-written document.
pub fn put_object(root: &Path, key: &str, body: Vec<u8>) -> Result<String, StorageError> {
    let path = object_path(root, key)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &body)?;
    fs::rename(&tmp_path, &path)?;
    Ok(etag(&body))
}

/// Write a document only if its current ETag is `expected_etag`, or, when
/// `expected_etag` is `None`, only if it does not exist yet. Returns the new
/// ETag on success, or `StorageError::Conflict` on a mismatch.
///
/// The caller must serialize calls for the same key; the check and the write
/// are two filesystem operations.
pub fn put_object_if_match(
    root: &Path,
    key: &str,
    body: Vec<u8>,
    expected_etag: Option<&str>,
) -> Result<String, StorageError> {
    let current = get_object_opt(root, key)?.map(|o| o.etag);
    if current.as_deref() != expected_etag {
        return Err(StorageError::Conflict {
            key: key.to_string(),
        });
    }
    put_object(root, key, body)
}

/// Keys of all documents directly under `prefix` (e.g. `"forms/"`), sorted.
pub fn list_objects(root: &Path, prefix: &str) -> Result<Vec<String>, StorageError> {
    let dir = object_path(root, prefix.trim_end_matches('/'))?;
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut keys = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            keys.push(format!("{prefix}{name}"));
        }
    }
    keys.sort();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips_with_stable_etag() {
        let dir = tempfile::tempdir().unwrap();
        let written = put_object(dir.path(), "forms/a.json", b"{}".to_vec()).unwrap();
        let read = get_object(dir.path(), "forms/a.json").unwrap();
        assert_eq!(read.body, b"{}");
        assert_eq!(read.etag, written);
        assert_eq!(written, etag(b"{}"));
        assert!(!dir.path().join("forms/a.json.tmp").exists());
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            get_object(dir.path(), "forms/missing.json"),
            Err(StorageError::NotFound { key }) if key == "forms/missing.json"
        ));
        assert!(get_object_opt(dir.path(), "forms/missing.json").unwrap().is_none());
    }

    #[test]
    fn conditional_put_checks_current_etag() {
        let dir = tempfile::tempdir().unwrap();
        let key = "progress/p/i.json";

        let first = put_object_if_match(dir.path(), key, b"1".to_vec(), None).unwrap();
        assert!(matches!(
            put_object_if_match(dir.path(), key, b"x".to_vec(), None),
            Err(StorageError::Conflict { .. })
        ));
        assert!(matches!(
            put_object_if_match(dir.path(), key, b"x".to_vec(), Some("stale")),
            Err(StorageError::Conflict { .. })
        ));
        let second = put_object_if_match(dir.path(), key, b"2".to_vec(), Some(&first)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn lists_json_documents_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        put_object(dir.path(), "forms/b.json", b"{}".to_vec()).unwrap();
        put_object(dir.path(), "forms/a.json", b"{}".to_vec()).unwrap();
        put_object(dir.path(), "protocols/knee.json", b"{}".to_vec()).unwrap();
        assert_eq!(
            list_objects(dir.path(), "forms/").unwrap(),
            vec!["forms/a.json", "forms/b.json"]
        );
        assert!(list_objects(dir.path(), "completions/").unwrap().is_empty());
    }

    #[test]
    fn keys_cannot_leave_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        for key in ["progress/../../escaped/x.json", "progress//x.json", "./forms/a.json", "forms/a\\..\\b.json"] {
            assert!(
                matches!(
                    put_object(&root, key, b"{}".to_vec()),
                    Err(StorageError::InvalidKey { .. })
                ),
                "{key} should be rejected"
            );
            assert!(matches!(get_object(&root, key), Err(StorageError::InvalidKey { .. })));
        }
        assert!(!dir.path().join("escaped").exists());
    }
}
