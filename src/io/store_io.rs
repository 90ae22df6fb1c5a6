use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::io::backend::{BackendError, CategoryBackend};
use crate::model::category::{Category, CategoryId};
use crate::ops::tree_ops::CategoryTree;

/// Current on-disk format version
pub const STORE_VERSION: u32 = 1;

/// Shape of the categories file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    /// Next id to assign. Only ever grows, so ids of deleted categories are
    /// never handed out again. Older files without it fall back to `max + 1`.
    #[serde(default)]
    pub next_id: Option<CategoryId>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Tree plus id counter, as held between a read and the following write
struct Contents {
    tree: CategoryTree,
    next_id: CategoryId,
}

impl Contents {
    fn allocate_id(&mut self) -> CategoryId {
        let after_max = self.tree.max_id().map_or(1, |id| id.0 + 1);
        let id = CategoryId(self.next_id.0.max(after_max));
        self.next_id = CategoryId(id.0 + 1);
        id
    }
}

/// Write via a sibling temp file and rename, so readers never see a
/// half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A [`CategoryBackend`] over a JSON file.
///
/// Every call re-reads the file, applies the change and writes it back, so
/// concurrent CLI and TUI processes see each other's writes. A missing file
/// reads as an empty forest.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty store unless the file already exists.
    pub fn create_if_missing(&self) -> Result<bool, BackendError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.write(&Contents {
            tree: CategoryTree::new(),
            next_id: CategoryId(1),
        })?;
        Ok(true)
    }

    fn read_file(&self) -> Result<Option<StoreFile>, BackendError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: StoreFile = serde_json::from_str(&content)?;
        if file.version != STORE_VERSION {
            return Err(BackendError::Rejected(format!(
                "unsupported store version {} in {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(Some(file))
    }

    /// The forest exactly as stored, without repairing parent links or slugs.
    pub fn read_forest(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.read_file()?.map(|f| f.categories).unwrap_or_default())
    }

    pub fn load(&self) -> Result<CategoryTree, BackendError> {
        Ok(self.read()?.tree)
    }

    fn read(&self) -> Result<Contents, BackendError> {
        let (forest, next_id) = match self.read_file()? {
            Some(file) => (file.categories, file.next_id),
            None => (Vec::new(), None),
        };
        Ok(Contents {
            tree: CategoryTree::from_forest(forest)?,
            next_id: next_id.unwrap_or(CategoryId(1)),
        })
    }

    fn write(&self, contents: &Contents) -> Result<(), BackendError> {
        let file = StoreFile {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            next_id: Some(contents.next_id),
            categories: contents.tree.to_forest(),
        };
        let mut content = serde_json::to_string_pretty(&file)?;
        content.push('\n');
        atomic_write(&self.path, content.as_bytes())?;
        log::debug!(
            "wrote {} categories to {}",
            contents.tree.len(),
            self.path.display()
        );
        Ok(())
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Contents) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut contents = self.read()?;
        let out = f(&mut contents)?;
        self.write(&contents)?;
        Ok(out)
    }
}

impl CategoryBackend for JsonStore {
    fn fetch_categories(&mut self) -> Result<Vec<Category>, BackendError> {
        Ok(self.load()?.to_forest())
    }

    fn create_category(
        &mut self,
        parent_id: Option<CategoryId>,
        name: &str,
    ) -> Result<Category, BackendError> {
        self.modify(|store| {
            let category = Category::new(store.allocate_id(), name, parent_id);
            store.tree.add_child(parent_id, category.clone())?;
            Ok(category)
        })
    }

    fn update_category(&mut self, id: CategoryId, name: &str) -> Result<Category, BackendError> {
        self.modify(|store| {
            store.tree.rename(id, name)?;
            store.tree.find_by_id(id).ok_or(BackendError::NotFound(id))
        })
    }

    fn set_category_active(&mut self, id: CategoryId, is_active: bool) -> Result<(), BackendError> {
        self.modify(|store| {
            let node = store.tree.get(id).ok_or(BackendError::NotFound(id))?;
            if node.is_active != is_active {
                store.tree.toggle_hidden(id)?;
            }
            Ok(())
        })
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), BackendError> {
        self.modify(|store| {
            store.tree.remove(id)?;
            Ok(())
        })
    }

    fn reparent_category(
        &mut self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<(), BackendError> {
        self.modify(|store| {
            store.tree.reparent(id, new_parent_id)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonStore {
        JsonStore::open(dir.path().join("categories.json"))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        assert!(store.fetch_categories().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn create_if_missing_only_once() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.create_if_missing().unwrap());
        assert!(!store.create_if_missing().unwrap());
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"version\": 1"));
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let roupas = store.create_category(None, "Roupas").unwrap();
        let camisetas = store.create_category(Some(roupas.id), "Camisetas").unwrap();
        store.update_category(camisetas.id, "Camisas").unwrap();
        store.set_category_active(roupas.id, false).unwrap();

        let mut reopened = JsonStore::open(store.path());
        let forest = reopened.fetch_categories().unwrap();
        assert_eq!(forest.len(), 1);
        assert!(!forest[0].is_active);
        assert_eq!(forest[0].children[0].name, "Camisas");
        assert_eq!(forest[0].children[0].slug, "camisas");
    }

    #[test]
    fn reparent_and_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let a = store.create_category(None, "A").unwrap();
        let b = store.create_category(Some(a.id), "B").unwrap();
        assert!(matches!(
            store.reparent_category(a.id, Some(b.id)),
            Err(BackendError::Rejected(_))
        ));
        store.reparent_category(b.id, None).unwrap();
        store.delete_category(a.id).unwrap();
        let forest = store.fetch_categories().unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, b.id);
        let err = store.delete_category(a.id).unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        fs::write(
            store.path(),
            r#"{"version": 9, "saved_at": "2026-01-01T00:00:00Z", "categories": []}"#,
        )
        .unwrap();
        let err = store.fetch_categories().unwrap_err();
        assert!(matches!(err, BackendError::Rejected(_)));
    }

    #[test]
    fn malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        fs::write(store.path(), "not json {{{").unwrap();
        let err = store.fetch_categories().unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.create_category(None, "Roupas").unwrap();
        let bolsos = store.create_category(None, "Bolsos").unwrap();
        store.delete_category(bolsos.id).unwrap();

        // A second handle, as the CLI would open while the TUI runs
        let mut other = JsonStore::open(store.path());
        let promo = other.create_category(None, "Promo").unwrap();
        assert_ne!(promo.id, bolsos.id);
        assert_eq!(promo.id, CategoryId(3));

        // A late rename of the deleted category must not land on the new one
        let err = store.update_category(bolsos.id, "Bolsas").unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
        let forest = store.fetch_categories().unwrap();
        assert_eq!(forest[1].name, "Promo");
    }

    #[test]
    fn files_without_counter_continue_after_max() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let legacy = r#"{
            "version": 1,
            "saved_at": "2026-01-01T00:00:00Z",
            "categories": [{ "id": 7, "name": "Roupas", "slug": "roupas" }]
        }"#;
        fs::write(store.path(), legacy).unwrap();
        let created = store.create_category(None, "Bolsos").unwrap();
        assert_eq!(created.id, CategoryId(8));
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"next_id\": 9"));
    }
}
