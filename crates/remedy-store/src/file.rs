//! File-level snapshot operations.
//!
//! Two write disciplines are provided:
//!
//! - [`save`] rewrites a file wholesale via the temp-file-then-rename
//!   pattern, so readers never observe a partially written snapshot.
//! - [`create_new`] creates a file exclusively and fails if it already
//!   exists, for write-once files such as cabinets.
//!
//! Reads come in two flavors: [`load`] propagates every failure, while
//! [`try_load`] maps a missing file to `None` so callers can fall back
//! to a default.

use crate::envelope;
use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a versioned snapshot from `path`.
///
/// # Errors
///
/// Fails on any IO error (including a missing file), a version
/// mismatch, or a payload decode failure.
pub async fn load<T: DeserializeOwned>(path: &Path, version: u32) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    envelope::decode(version, &bytes)
}

/// Load a versioned snapshot, mapping a missing file to `None`.
///
/// Decode failures and version mismatches are still errors; only
/// `NotFound` is absorbed.
pub async fn try_load<T: DeserializeOwned>(path: &Path, version: u32) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(envelope::decode(version, &bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Atomically replace the snapshot at `path`.
///
/// The envelope is written to a sibling `.tmp` file first and renamed
/// over the target, so a crash mid-write leaves the previous snapshot
/// intact.
pub async fn save<T: Serialize>(path: &Path, version: u32, value: &T) -> Result<()> {
    let bytes = envelope::encode(version, value)?;
    let temp_path = make_temp_path(path);

    if let Err(err) = tokio::fs::write(&temp_path, &bytes).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(err.into());
    }
    tokio::fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot replaced");
    Ok(())
}

/// Create the snapshot at `path` exclusively.
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if a file with that name exists;
/// an existing snapshot is never overwritten.
pub async fn create_new<T: Serialize>(path: &Path, version: u32, value: &T) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let bytes = envelope::encode(version, value)?;
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    file.write_all(&bytes).await?;
    file.flush().await?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot created");
    Ok(())
}

fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.as_os_str().to_os_string();
    temp_path.push(".tmp");
    PathBuf::from(temp_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        id: u64,
        comment: String,
    }

    fn sample(id: u64) -> Snapshot {
        Snapshot {
            id,
            comment: format!("snapshot {id}"),
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state");

        save(&path, 1, &sample(7)).await.unwrap();
        let loaded: Snapshot = load(&path, 1).await.unwrap();
        assert_eq!(loaded, sample(7));
    }

    #[tokio::test]
    async fn save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state");

        save(&path, 1, &sample(1)).await.unwrap();
        save(&path, 1, &sample(2)).await.unwrap();

        let loaded: Snapshot = load(&path, 1).await.unwrap();
        assert_eq!(loaded.id, 2);
        assert!(!make_temp_path(&path).exists());
    }

    #[tokio::test]
    async fn load_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result: Result<Snapshot> = load(&dir.path().join("absent"), 1).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn try_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Snapshot> = try_load(&dir.path().join("absent"), 1).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn try_load_version_mismatch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state");

        save(&path, 1, &sample(3)).await.unwrap();
        let result: Result<Option<Snapshot>> = try_load(&path, 2).await;
        assert!(matches!(result, Err(Error::VersionMismatch { .. })));
    }

    #[tokio::test]
    async fn create_new_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cabinet-20260101-000000");

        create_new(&path, 1, &sample(1)).await.unwrap();
        let err = create_new(&path, 1, &sample(2)).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        // The original contents survive the refused write.
        let loaded: Snapshot = load(&path, 1).await.unwrap();
        assert_eq!(loaded.id, 1);
    }
}
