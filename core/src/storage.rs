use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CardioError, CardioResult};

/// Nøkkel/verdi-lager med strengverdier (plattformens async storage).
///
/// Implementasjonene må tåle kall fra både UI-tråden og persisteringstråden.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> CardioResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> CardioResult<()>;
    fn remove_item(&self, key: &str) -> CardioResult<()>;
}

/// Én JSON-fil per nøkkel under en katalog.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filnavn fra nøkkel; tegn som ikke er trygge i filnavn byttes med `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> CardioResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> CardioResult<()> {
        fs::create_dir_all(&self.dir)?;
        // Skriv til tmp og rename, så en halvskrevet fil aldri blir lest ved oppstart
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("lagret {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> CardioResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lager i minnet, for tester og verter uten disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> CardioResult<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> CardioResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> CardioResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Leser inn en JSON-verdi fra lageret.
/// Finnes ikke nøkkelen, returneres `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> CardioResult<Option<T>> {
    let Some(contents) = store.get_item(key)? else {
        log::debug!("fant ikke {key} i lageret");
        return Ok(None);
    };
    let de = &mut serde_json::Deserializer::from_str(&contents);
    let value = serde_path_to_error::deserialize(de).map_err(CardioError::from_path_error)?;
    Ok(Some(value))
}

/// Lagrer en verdi som JSON (kompakt).
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> CardioResult<()> {
    let json = serde_json::to_string(value)?;
    store.set_item(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_for_sanitizes_key() {
        let store = FileStore::new("/tmp/x");
        let p = store.path_for("@TZpersisted:appleWatchStats");
        assert_eq!(p, PathBuf::from("/tmp/x/_TZpersisted_appleWatchStats.json"));
    }

    #[test]
    fn memory_store_roundtrip_and_remove() {
        let store = MemoryStore::new();
        save_json(&store, "k", &vec![1, 2, 3]).unwrap();
        let back: Option<Vec<i32>> = load_json(&store, "k").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        store.remove_item("k").unwrap();
        let gone: Option<Vec<i32>> = load_json(&store, "k").unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn load_json_reports_field_path() {
        let store = MemoryStore::new();
        store.set_item("k", r#"{"a": {"b": "ikke-tall"}}"#).unwrap();
        let err = load_json::<HashMap<String, HashMap<String, f64>>>(&store, "k").unwrap_err();
        match err {
            CardioError::Json { path, .. } => assert_eq!(path, "a.b"),
            other => panic!("uventet feil: {other:?}"),
        }
    }
}
