use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::document::DiagramDocument;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One pretty-printed JSON file per key inside a directory.
///
/// Saves go through a sibling `.tmp` file that is renamed over the target,
/// so an interrupted save leaves the previous diagram readable.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Io(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// `netdraft/diagrams` under the platform's local data directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine a data directory".to_string()))?;
        Self::new(base.join("netdraft").join("diagrams"))
    }

    pub fn base_path(&self) -> &Path {
        &self.dir
    }

    /// File for a key. Characters outside `[A-Za-z0-9_-]` become `_`.
    fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(stem).with_extension("json")
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
}

impl Storage for FileStorage {
    fn save(&self, key: &str, document: &DiagramDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(key);
        let encoded = encode(document);
        Box::pin(async move {
            let json = encoded?;
            let staging = path.with_extension("json.tmp");
            fs::write(&staging, json).map_err(|e| io_error("write", &staging, e))?;
            fs::rename(&staging, &path).map_err(|e| io_error("replace", &path, e))
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<DiagramDocument>> {
        let path = self.path_for(key);
        let key = key.to_string();
        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(StorageError::NotFound(key));
                }
                Err(e) => return Err(io_error("read", &path, e)),
            };
            decode(&key, &json)
        })
    }
}
