use crate::model::{StorageError, Store};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Indented JSON snapshot of the [`Store`] on disk.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot. A missing file is an empty store, not an error.
    pub fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Can't load store; {} does not exist", self.path.display());
                return Ok(Store::default());
            }
            Err(e) => return Err(e.into()),
        };

        let store: Store = serde_json::from_str(&content)?;
        info!(
            "Loaded {} restaurants and {} geocoded addresses from {}",
            store.restaurants.len(),
            store.geocode_cache.len(),
            self.path.display()
        );
        Ok(store)
    }

    /// Writes the snapshot to a sibling temp file, then renames it over the old one.
    pub fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(store)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = Self::write_and_replace(&tmp_path, &self.path, json.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        info!("Saved {} restaurants to {}", store.restaurants.len(), self.path.display());
        Ok(())
    }

    fn write_and_replace(tmp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(bytes)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);
        fs::rename(tmp_path, path)
    }
}
