//! Reading and atomically rewriting the denylist document.
//!
//! The document is JSON: `{"blacklist": ["203.0.113.7", "198.51.100.0/24"]}`.
//! A new version is written to `<file>.tmp` next to the real file and then
//! renamed over it, so concurrent readers see either the old or the new list.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::entry::DenyEntry;
use crate::error::DenylistError;
use crate::fs_abstraction::FileSystem;

/// On-disk denylist document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenylistDocument {
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl DenylistDocument {
    pub fn from_entries(entries: &[DenyEntry]) -> Self {
        Self {
            blacklist: entries.iter().map(ToString::to_string).collect(),
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }
}

/// Sibling temp path used while writing `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("denylist"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load the raw entry strings.
///
/// A missing or unreadable document is treated as an empty list. The caller
/// still gets a warning in the log so an accidental truncation can be traced.
pub fn load_denylist(fs: &dyn FileSystem, path: &Path) -> Vec<String> {
    let content = match fs.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read denylist {:?}: {} (treating as empty)", path, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<DenylistDocument>(&content) {
        Ok(doc) => doc.blacklist,
        Err(e) => {
            warn!("Failed to parse denylist {:?}: {} (treating as empty)", path, e);
            Vec::new()
        }
    }
}

/// Write `entries` to `path` via a sibling temp file and a rename.
///
/// On failure the file at `path` is left exactly as it was.
pub fn save_atomic(
    fs: &dyn FileSystem,
    path: &Path,
    entries: &[DenyEntry],
) -> Result<(), DenylistError> {
    let content = DenylistDocument::from_entries(entries).to_json()?;
    let tmp_path = temp_path_for(path);

    fs.write_synced(&tmp_path, content.as_bytes()).map_err(|e| {
        error!("Failed to write {:?}: {}", tmp_path, e);
        DenylistError::io(&tmp_path, e)
    })?;

    fs.rename(&tmp_path, path).map_err(|e| {
        error!("Failed to replace {:?}: {}", path, e);
        DenylistError::io(path, e)
    })?;

    info!("Optimization complete. Total entries: {}", entries.len());
    info!("Saved to: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::{real_fs, MockFileSystem, RealFileSystem};
    use mockall::Sequence;
    use std::io;
    use tempfile::TempDir;

    fn entries(items: &[&str]) -> Vec<DenyEntry> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    /// Real filesystem whose rename always fails, as if the run died before it.
    struct FailingRename;

    impl FileSystem for FailingRename {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            RealFileSystem.read_to_string(path)
        }

        fn write_synced(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            RealFileSystem.write_synced(path, contents)
        }

        fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "interrupted"))
        }

        fn metadata(&self, path: &Path) -> io::Result<std::fs::Metadata> {
            RealFileSystem.metadata(path)
        }
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/srv/html/blacklist.json")),
            PathBuf::from("/srv/html/blacklist.json.tmp")
        );
        assert_eq!(temp_path_for(Path::new("list")), PathBuf::from("list.tmp"));
    }

    #[test]
    fn test_document_format() {
        let doc = DenylistDocument::from_entries(&entries(&["10.0.0.0/8", "192.0.2.1"]));
        assert_eq!(
            doc.to_json().unwrap(),
            "{\n  \"blacklist\": [\n    \"10.0.0.0/8\",\n    \"192.0.2.1\"\n  ]\n}\n"
        );
    }

    #[test]
    fn test_load_ignores_other_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.json");
        std::fs::write(&path, r#"{"updated": "today", "blacklist": ["192.0.2.1"]}"#).unwrap();

        assert_eq!(load_denylist(real_fs(), &path), vec!["192.0.2.1".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        assert!(load_denylist(real_fs(), &path).is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.json");
        std::fs::write(&path, "{\"blacklist\": [").unwrap();
        assert!(load_denylist(real_fs(), &path).is_empty());
    }

    #[test]
    fn test_load_document_without_list_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(load_denylist(real_fs(), &path).is_empty());
    }

    #[test]
    fn test_save_atomic_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.json");
        std::fs::write(&path, "{\"blacklist\": [\"old\"]}").unwrap();

        save_atomic(real_fs(), &path, &entries(&["198.51.100.0/24"])).unwrap();

        assert_eq!(load_denylist(real_fs(), &path), vec!["198.51.100.0/24".to_string()]);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_save_atomic_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.json");

        save_atomic(real_fs(), &path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"blacklist\": []\n}\n");
    }

    #[test]
    fn test_interrupted_before_rename_leaves_file_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.json");
        let original = b"{\n  \"blacklist\": [\"203.0.113.7\"]\n}";
        std::fs::write(&path, original).unwrap();

        let result = save_atomic(&FailingRename, &path, &entries(&["10.0.0.0/8"]));

        assert!(matches!(result, Err(DenylistError::Io { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_write_failure_skips_rename() {
        let mut mock = MockFileSystem::new();
        mock.expect_write_synced()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::Other, "disk full")));
        mock.expect_rename().times(0);

        let result = save_atomic(&mock, Path::new("/srv/blacklist.json"), &[]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("blacklist.json.tmp"));
    }

    #[test]
    fn test_save_writes_temp_then_renames() {
        let mut mock = MockFileSystem::new();
        let mut seq = Sequence::new();

        mock.expect_write_synced()
            .withf(|p, c| {
                p == Path::new("/srv/blacklist.json.tmp")
                    && std::str::from_utf8(c).is_ok_and(|s| s.contains("192.0.2.0/24"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_rename()
            .withf(|from, to| {
                from == Path::new("/srv/blacklist.json.tmp")
                    && to == Path::new("/srv/blacklist.json")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        save_atomic(&mock, Path::new("/srv/blacklist.json"), &entries(&["192.0.2.0/24"]))
            .unwrap();
    }
}
