//! JSON snapshot files, the pipeline's persistence between stages.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::CollectError;

/// Serialize `data` as pretty-printed UTF-8 JSON at `path`, overwriting any
/// existing file. No atomic rename: a crash mid-write can corrupt the file,
/// and the fix is re-running the stage that produced it.
pub fn write_snapshot<T: Serialize>(path: &Path, data: &T) -> Result<(), CollectError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(data)
        .map_err(|e| CollectError::Decode(format!("serialize snapshot: {e}")))?;
    fs::write(path, json)?;

    info!(path = %path.display(), "snapshot written");
    Ok(())
}

/// Read a snapshot previously produced by [`write_snapshot`].
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, CollectError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CollectError::Decode(format!("parse snapshot {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VideoRecord;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("castlog_snap_{}_{name}", std::process::id()))
    }

    #[test]
    fn snapshot_round_trip() {
        let path = temp_path("roundtrip.json");
        let records = vec![VideoRecord {
            video_id: "abc123".to_string(),
            title: "Leo Plays Myst".to_string(),
            description: "Part one.".to_string(),
            published_at: "2021-03-04T17:00:00Z".to_string(),
        }];

        write_snapshot(&path, &records).unwrap();
        let read: Vec<VideoRecord> = read_snapshot(&path).unwrap();
        assert_eq!(read, records);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn snapshot_is_indented() {
        let path = temp_path("indent.json");
        write_snapshot(&path, &serde_json::json!({ "key": ["value"] })).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"key\""));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn snapshot_overwrites_existing_file() {
        let path = temp_path("overwrite.json");
        write_snapshot(&path, &vec!["old"]).unwrap();
        write_snapshot(&path, &vec!["new"]).unwrap();

        let read: Vec<String> = read_snapshot(&path).unwrap();
        assert_eq!(read, vec!["new"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn read_missing_snapshot_is_an_io_error() {
        let err = read_snapshot::<Vec<VideoRecord>>(&temp_path("missing.json")).unwrap_err();
        assert!(matches!(err, CollectError::Io(_)));
    }
}
