use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::document::DiagramDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps encoded documents in a map. Used by tests and by embedders that
/// persist elsewhere.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Memory store poisoned: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, document: &DiagramDocument) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let encoded = encode(document);
        Box::pin(async move {
            let json = encoded?;
            self.entries.write().map_err(poisoned)?.insert(key, json);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<DiagramDocument>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            match entries.get(&key) {
                Some(json) => decode(&key, json),
                None => Err(StorageError::NotFound(key)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeRecord;
    use crate::shapes::NodeKind;
    use pollster::block_on;

    fn document(x: f64) -> DiagramDocument {
        DiagramDocument {
            nodes: vec![NodeRecord {
                id: "a1".into(),
                kind: NodeKind::Activity,
                x,
                y: 0.0,
                span: 2,
            }],
            ..DiagramDocument::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("plan", &document(25.0))).unwrap();
        assert_eq!(block_on(storage.load("plan")).unwrap(), document(25.0));
    }

    #[test]
    fn test_save_replaces() {
        let storage = MemoryStorage::new();
        block_on(storage.save("plan", &document(25.0))).unwrap();
        block_on(storage.save("plan", &document(50.0))).unwrap();
        assert_eq!(block_on(storage.load("plan")).unwrap(), document(50.0));
    }

    #[test]
    fn test_keys_are_independent() {
        let storage = MemoryStorage::new();
        block_on(storage.save("plan", &document(25.0))).unwrap();

        let result = block_on(storage.load("other"));
        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == "other"));
    }
}
