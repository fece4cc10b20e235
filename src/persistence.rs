use crate::config::{PersistenceKey, project_dirs};
use crate::slots::is_permutation;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structural snapshot of a wheel. Slot contents are not stored; callers
/// re-supply them on load and use [`LayoutData::arrange`] to restore order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutData {
    pub slot_count: usize,
    /// `-1` when nothing is selected.
    pub selected_index: i64,
    /// `slot_order[i]` is the original slot of whatever now sits at `i`.
    pub slot_order: Vec<usize>,
}

impl LayoutData {
    pub fn new(slot_count: usize, selected: Option<usize>, slot_order: Vec<usize>) -> Self {
        Self {
            slot_count,
            selected_index: selected.map_or(-1, |i| i as i64),
            slot_order,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        usize::try_from(self.selected_index)
            .ok()
            .filter(|&i| i < self.slot_count)
    }

    pub fn validate(&self, slot_count: usize) -> Result<(), PersistenceError> {
        if self.slot_count != slot_count {
            return Err(PersistenceError::SlotCountMismatch {
                expected: slot_count,
                actual: self.slot_count,
            });
        }
        if !is_permutation(&self.slot_order, slot_count) {
            return Err(PersistenceError::InvalidOrder);
        }
        if self.selected_index < -1 || self.selected_index >= slot_count as i64 {
            return Err(PersistenceError::InvalidSelection(self.selected_index));
        }
        Ok(())
    }

    /// Rearranges items given in original slot order into the saved layout.
    /// Returns `None` when the lengths disagree.
    pub fn arrange<T: Clone>(&self, items: &[Option<T>]) -> Option<Vec<Option<T>>> {
        if items.len() != self.slot_order.len() {
            return None;
        }
        self.slot_order
            .iter()
            .map(|&src| items.get(src).cloned())
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Persistence key cannot be empty")]
    EmptyKey,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed layout: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Layout has {actual} slots, wheel has {expected}")]
    SlotCountMismatch { expected: usize, actual: usize },
    #[error("Layout slot order is not a permutation")]
    InvalidOrder,
    #[error("Layout selected index {0} is out of range")]
    InvalidSelection(i64),
    #[error("Failed to determine data directory")]
    DataDirNotFound,
}

/// Keyed storage for wheel layouts.
pub trait LayoutStore {
    fn has(&self, key: &PersistenceKey) -> bool;
    fn load(&self, key: &PersistenceKey) -> Result<Option<LayoutData>, PersistenceError>;
    fn save(&self, key: &PersistenceKey, data: &LayoutData) -> Result<(), PersistenceError>;
    fn delete(&self, key: &PersistenceKey) -> Result<(), PersistenceError>;
}

fn require_key(key: &PersistenceKey) -> Result<(), PersistenceError> {
    if key.is_blank() {
        Err(PersistenceError::EmptyKey)
    } else {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    layouts: RwLock<HashMap<PersistenceKey, LayoutData>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.read().is_empty()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn has(&self, key: &PersistenceKey) -> bool {
        self.layouts.read().contains_key(key)
    }

    fn load(&self, key: &PersistenceKey) -> Result<Option<LayoutData>, PersistenceError> {
        require_key(key)?;
        Ok(self.layouts.read().get(key).cloned())
    }

    fn save(&self, key: &PersistenceKey, data: &LayoutData) -> Result<(), PersistenceError> {
        require_key(key)?;
        self.layouts.write().insert(key.clone(), data.clone());
        Ok(())
    }

    fn delete(&self, key: &PersistenceKey) -> Result<(), PersistenceError> {
        require_key(key)?;
        self.layouts.write().remove(key);
        Ok(())
    }
}

/// One pretty-printed JSON file per key.
#[derive(Debug, Clone)]
pub struct JsonFileLayoutStore {
    dir: PathBuf,
}

impl JsonFileLayoutStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        if !dir.exists() {
            fs_err::create_dir_all(&dir)?;
            log::info!("[JsonFileLayoutStore] Created directory: {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// `<data dir>/quickwheel/layouts`.
    pub fn in_data_dir() -> Result<Self, PersistenceError> {
        let dirs = project_dirs().ok_or(PersistenceError::DataDirNotFound)?;
        Self::new(dirs.data_dir().join("layouts"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, key: &PersistenceKey) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if matches!(c, '\\' | '/' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl LayoutStore for JsonFileLayoutStore {
    fn has(&self, key: &PersistenceKey) -> bool {
        !key.is_blank() && self.file_path(key).exists()
    }

    fn load(&self, key: &PersistenceKey) -> Result<Option<LayoutData>, PersistenceError> {
        require_key(key)?;
        let path = self.file_path(key);
        if !path.exists() {
            log::debug!("[JsonFileLayoutStore] File not found: {}", path.display());
            return Ok(None);
        }
        let json = fs_err::read_to_string(&path)?;
        let data = serde_json::from_str(&json)?;
        log::debug!("[JsonFileLayoutStore] Loaded from: {}", path.display());
        Ok(Some(data))
    }

    fn save(&self, key: &PersistenceKey, data: &LayoutData) -> Result<(), PersistenceError> {
        require_key(key)?;
        let path = self.file_path(key);
        fs_err::write(&path, serde_json::to_string_pretty(data)?)?;
        log::debug!("[JsonFileLayoutStore] Saved to: {}", path.display());
        Ok(())
    }

    fn delete(&self, key: &PersistenceKey) -> Result<(), PersistenceError> {
        require_key(key)?;
        let path = self.file_path(key);
        if path.exists() {
            fs_err::remove_file(&path)?;
            log::debug!("[JsonFileLayoutStore] Deleted: {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFileLayoutStore {
        let dir = std::env::temp_dir().join(format!(
            "quickwheel-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs_err::remove_dir_all(&dir);
        JsonFileLayoutStore::new(dir).unwrap()
    }

    #[test]
    fn test_wire_shape() {
        let data = LayoutData::new(9, None, (0..9).collect());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["SlotCount"], 9);
        assert_eq!(json["SelectedIndex"], -1);
        assert_eq!(json["SlotOrder"][8], 8);

        let parsed: LayoutData = serde_json::from_str(
            r#"{"SlotCount": 3, "SelectedIndex": 2, "SlotOrder": [2, 0, 1]}"#,
        )
        .unwrap();
        assert_eq!(parsed.selected(), Some(2));
    }

    #[test]
    fn test_validate() {
        assert!(LayoutData::new(3, Some(1), vec![1, 0, 2]).validate(3).is_ok());
        assert!(matches!(
            LayoutData::new(3, None, vec![0, 1, 2]).validate(4),
            Err(PersistenceError::SlotCountMismatch { .. })
        ));
        assert!(matches!(
            LayoutData::new(3, None, vec![0, 0, 2]).validate(3),
            Err(PersistenceError::InvalidOrder)
        ));
        let mut bad = LayoutData::new(3, None, vec![0, 1, 2]);
        bad.selected_index = 3;
        assert!(matches!(
            bad.validate(3),
            Err(PersistenceError::InvalidSelection(3))
        ));
    }

    #[test]
    fn test_arrange() {
        let layout = LayoutData::new(3, None, vec![2, 0, 1]);
        let items = [Some('a'), None, Some('c')];
        assert_eq!(layout.arrange(&items), Some(vec![Some('c'), Some('a'), None]));
        assert_eq!(layout.arrange(&items[..2]), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryLayoutStore::new();
        let key = PersistenceKey::new("hotbar");
        assert!(!store.has(&key));
        assert_eq!(store.load(&key).unwrap(), None);

        let data = LayoutData::new(4, Some(3), vec![0, 1, 3, 2]);
        store.save(&key, &data).unwrap();
        assert!(store.has(&key));
        assert_eq!(store.load(&key).unwrap(), Some(data));

        store.delete(&key).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.save(&PersistenceKey::new(""), &LayoutData::new(3, None, vec![0, 1, 2])),
            Err(PersistenceError::EmptyKey)
        ));
    }

    #[test]
    fn test_json_store_round_trip_on_disk() {
        let store = temp_store("roundtrip");
        let key = PersistenceKey::new("mods/voice:wheel");
        let data = LayoutData::new(9, Some(5), vec![0, 1, 2, 3, 4, 8, 6, 7, 5]);

        store.save(&key, &data).unwrap();
        assert!(store.has(&key));
        assert!(store.dir().join("mods_voice_wheel.json").exists());
        assert_eq!(store.load(&key).unwrap(), Some(data));

        store.delete(&key).unwrap();
        assert!(!store.has(&key));
        assert_eq!(store.load(&key).unwrap(), None);
        let _ = fs_err::remove_dir_all(store.dir());
    }

    #[test]
    fn test_json_store_malformed_file() {
        let store = temp_store("malformed");
        let key = PersistenceKey::new("broken");
        fs_err::write(store.dir().join("broken.json"), "{ not json").unwrap();

        assert!(matches!(store.load(&key), Err(PersistenceError::Json(_))));
        let _ = fs_err::remove_dir_all(store.dir());
    }
}
