//! Local trust metadata store lookup.
//!
//! Docker keeps per-repository TUF metadata under its config directory, e.g.
//! `~/.docker/trust/tuf/docker.io/acme/widget/metadata/root.json`. Each
//! `root.json` is indexed by the directory above `metadata/`, and a
//! repository matches when that directory ends with the repository's path
//! components. `acme/widget` therefore never matches `xacme/widget`.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{RegdefError, RegdefResult};

const ROOT_FILE: &str = "root.json";
const METADATA_DIR: &str = "metadata";

/// A `root.json` found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Repository directory relative to the store root.
    pub repository: PathBuf,
    /// Full path of the `root.json` file.
    pub path: PathBuf,
}

/// Read-only view over a trust metadata directory tree.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All `<repository>/metadata/root.json` files, in file-name order.
    pub fn entries(&self) -> Vec<StoreEntry> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable store entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != ROOT_FILE {
                continue;
            }

            let path = entry.path();
            let Some(metadata_dir) = path.parent() else {
                continue;
            };
            if metadata_dir.file_name().map_or(true, |n| n != METADATA_DIR) {
                continue;
            }
            let Some(repo_dir) = metadata_dir.parent() else {
                continue;
            };
            let Ok(repository) = repo_dir.strip_prefix(&self.root) else {
                continue;
            };

            entries.push(StoreEntry {
                repository: repository.to_path_buf(),
                path: path.to_path_buf(),
            });
        }

        entries
    }

    /// Metadata files belonging to `repository_name` (`namespace/repository`).
    pub fn candidates(&self, repository_name: &str) -> Vec<PathBuf> {
        let wanted = Path::new(repository_name.trim_matches('/'));
        if wanted.as_os_str().is_empty() {
            return Vec::new();
        }

        self.entries()
            .into_iter()
            .filter(|entry| entry.repository.ends_with(wanted))
            .map(|entry| entry.path)
            .collect()
    }

    /// Find the public key for `root_key_id` in the repository's metadata.
    ///
    /// Candidates are tried in order and the first one holding the key wins.
    /// Unreadable or malformed candidates are logged and skipped.
    pub fn resolve_public_key(
        &self,
        repository_name: &str,
        root_key_id: &str,
    ) -> RegdefResult<String> {
        let candidates = self.candidates(repository_name);
        if candidates.is_empty() {
            return Err(RegdefError::KeyFileNotFound {
                repository: repository_name.to_string(),
                store: self.root.clone(),
            });
        }

        let mut last_corrupt = None;
        let mut corrupt = 0usize;

        for path in &candidates {
            match lookup_key(path, root_key_id) {
                Ok(Some(public_key)) => {
                    tracing::debug!(path = %path.display(), key_id = %root_key_id, "found public key");
                    return Ok(public_key);
                }
                Ok(None) => {
                    tracing::debug!(path = %path.display(), key_id = %root_key_id, "key not in metadata file");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping container metadata file");
                    corrupt += 1;
                    last_corrupt = Some(err);
                }
            }
        }

        match last_corrupt {
            Some(err) if corrupt == candidates.len() => Err(err),
            _ => Err(RegdefError::KeyIdNotFound {
                repository: repository_name.to_string(),
                key_id: root_key_id.to_string(),
            }),
        }
    }
}

/// Resolve a public key from the store rooted at `store_root`.
pub fn resolve_public_key(
    store_root: &Path,
    repository_name: &str,
    root_key_id: &str,
) -> RegdefResult<String> {
    MetadataStore::new(store_root).resolve_public_key(repository_name, root_key_id)
}

/// `signed.keys[key_id].keyval.public` of one metadata file.
fn lookup_key(path: &Path, key_id: &str) -> RegdefResult<Option<String>> {
    let corrupt = |message: String| RegdefError::KeyFileCorrupt {
        path: path.to_path_buf(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
    if !value.is_object() {
        return Err(corrupt("expected a JSON object".to_string()));
    }

    let Some(entry) = value
        .get("signed")
        .and_then(|signed| signed.get("keys"))
        .and_then(|keys| keys.get(key_id))
    else {
        return Ok(None);
    };

    entry
        .pointer("/keyval/public")
        .and_then(Value::as_str)
        .map(|public| Some(public.to_string()))
        .ok_or_else(|| corrupt(format!("key {key_id} has no keyval.public string")))
}
