//! Session persistence over a flat string key-value store.

use crate::error::{PlayerError, Result};
use crate::playback::PlaybackConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

const KEY_INDEX: &str = "index";
const KEY_STUDY_LANG: &str = "study_lang";
const KEY_TRANSLATION_LANG: &str = "translation_lang";
const KEY_STUDY_VOICE: &str = "study_voice";
const KEY_ALTERNATE_VOICE: &str = "alternate_voice";
const KEY_TRANSLATION_VOICE: &str = "translation_voice";
const KEY_SPEED: &str = "speed";
const KEY_PAUSE_SECS: &str = "pause_secs";
const KEY_REPEAT_COUNT: &str = "repeat_count";
const KEY_SHOW_TRANSLATION: &str = "show_translation";
const KEY_DECK_LABEL: &str = "deck_label";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Persist pending writes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// TOML file holding a single table of string values.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStore {
    /// Open the store; a missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(data) => match toml::from_str::<BTreeMap<String, String>>(&data) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), "Ignoring invalid session file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), "No session file ({err})");
                BTreeMap::new()
            }
        };
        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string(&self.values)?;
        fs::write(&self.path, contents)?;
        self.dirty = false;
        debug!(path = %self.path.display(), "Saved session");
        Ok(())
    }
}

/// Everything needed to resume where the user left off.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub config: PlaybackConfig,
    pub index: usize,
    pub deck_label: Option<String>,
}

pub struct SessionStore<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        let config = &snapshot.config;
        self.put(KEY_INDEX, Some(snapshot.index.to_string()));
        self.put(KEY_STUDY_LANG, config.study_language.clone());
        self.put(KEY_TRANSLATION_LANG, config.translation_language.clone());
        self.put(KEY_STUDY_VOICE, config.study_voice.clone());
        self.put(KEY_ALTERNATE_VOICE, config.alternate_study_voice.clone());
        self.put(KEY_TRANSLATION_VOICE, config.translation_voice.clone());
        self.put(KEY_SPEED, Some(config.speed.to_string()));
        self.put(KEY_PAUSE_SECS, Some(config.pause_secs.to_string()));
        self.put(KEY_REPEAT_COUNT, Some(config.repeat_count.to_string()));
        self.put(KEY_SHOW_TRANSLATION, Some(config.show_translation.to_string()));
        self.put(KEY_DECK_LABEL, snapshot.deck_label.clone());
        self.store.flush()
    }

    /// Read the saved snapshot. Missing or invalid state yields `None`.
    pub fn load(&self, defaults: &PlaybackConfig) -> Option<SessionSnapshot> {
        match self.try_load(defaults) {
            Ok(Some(snapshot)) => {
                info!(
                    index = snapshot.index,
                    deck = snapshot.deck_label.as_deref().unwrap_or(""),
                    "Restored session"
                );
                Some(snapshot)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("Discarding saved session: {err}");
                None
            }
        }
    }

    pub fn try_load(&self, defaults: &PlaybackConfig) -> Result<Option<SessionSnapshot>> {
        if self.get(KEY_INDEX).is_none() && self.get(KEY_DECK_LABEL).is_none() {
            return Ok(None);
        }

        let mut config = defaults.clone();
        config.study_language = self.get(KEY_STUDY_LANG);
        config.translation_language = self.get(KEY_TRANSLATION_LANG);
        config.study_voice = self.get(KEY_STUDY_VOICE);
        config.alternate_study_voice = self.get(KEY_ALTERNATE_VOICE);
        config.translation_voice = self.get(KEY_TRANSLATION_VOICE);
        if let Some(speed) = self.parse(KEY_SPEED)? {
            config.speed = speed;
        }
        if let Some(pause) = self.parse(KEY_PAUSE_SECS)? {
            config.pause_secs = pause;
        }
        if let Some(count) = self.parse(KEY_REPEAT_COUNT)? {
            config.repeat_count = count;
        }
        if let Some(show) = self.parse(KEY_SHOW_TRANSLATION)? {
            config.show_translation = show;
        }

        Ok(Some(SessionSnapshot {
            config: config.normalized(),
            index: self.parse(KEY_INDEX)?.unwrap_or(0),
            deck_label: self.get(KEY_DECK_LABEL),
        }))
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn get(&self, name: &str) -> Option<String> {
        self.store
            .get(&self.key(name))
            .filter(|value| !value.is_empty())
    }

    fn put(&mut self, name: &str, value: Option<String>) {
        let key = self.key(name);
        match value {
            Some(value) => self.store.set(&key, value),
            None => self.store.remove(&key),
        }
    }

    fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|_| {
                    PlayerError::PersistedStateInvalid(format!("`{name}` has value `{raw}`"))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "flashcards-{name}-{}-{nanos}.toml",
            std::process::id()
        ))
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            config: PlaybackConfig {
                study_language: Some("en-GB".to_string()),
                translation_language: Some("es-ES".to_string()),
                study_voice: Some("g-uk-male".to_string()),
                alternate_study_voice: Some("samantha".to_string()),
                translation_voice: None,
                speed: 1.25,
                pause_secs: 3.5,
                repeat_count: 3,
                show_translation: false,
            },
            index: 4,
            deck_label: Some("travel.json".to_string()),
        }
    }

    #[test]
    fn save_then_load_reproduces_snapshot() {
        let mut store = SessionStore::new(MemoryStore::new(), "flashcards.");
        store.save(&snapshot()).expect("save");
        let loaded = store.load(&PlaybackConfig::default()).expect("snapshot");
        assert_eq!(loaded, snapshot());
        assert_eq!(
            store.inner().get("flashcards.index").as_deref(),
            Some("4")
        );
    }

    #[test]
    fn empty_store_loads_nothing() {
        let store = SessionStore::new(MemoryStore::new(), "flashcards.");
        assert!(store.load(&PlaybackConfig::default()).is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut inner = MemoryStore::new();
        inner.set("flashcards.index", "two".to_string());
        let store = SessionStore::new(inner, "flashcards.");
        assert!(matches!(
            store.try_load(&PlaybackConfig::default()),
            Err(PlayerError::PersistedStateInvalid(_))
        ));
        assert!(store.load(&PlaybackConfig::default()).is_none());
    }

    #[test]
    fn stored_numbers_are_clamped() {
        let mut inner = MemoryStore::new();
        inner.set("flashcards.index", "0".to_string());
        inner.set("flashcards.repeat_count", "500".to_string());
        let store = SessionStore::new(inner, "flashcards.");
        let loaded = store.load(&PlaybackConfig::default()).expect("snapshot");
        assert_eq!(loaded.config.repeat_count, 20);
        assert_eq!(loaded.config.speed, 1.0);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let path = unique_path("session");
        let mut store = SessionStore::new(FileStore::open(&path), "flashcards.");
        store.save(&snapshot()).expect("save to file");

        let reopened = SessionStore::new(FileStore::open(&path), "flashcards.");
        let loaded = reopened
            .load(&PlaybackConfig::default())
            .expect("snapshot from file");
        assert_eq!(loaded, snapshot());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = unique_path("corrupt");
        fs::write(&path, "this is = = not toml").expect("write corrupt file");
        let store = FileStore::open(&path);
        assert!(store.get("flashcards.index").is_none());
        let _ = fs::remove_file(&path);
    }
}
