//! Translation tables for `@Localize[key]`.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{info, warn};

/// Looks up a localized string. Unknown keys translate to themselves.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("could not read translations: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid translation file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    entries: HashMap<String, String>,
}

impl Translations {
    /// Flattens nested objects into dotted keys, keeping only string leaves.
    pub fn from_value(value: &Value) -> Self {
        let mut entries = HashMap::new();
        if let Value::Object(map) = value {
            let mut path = Vec::new();
            flatten(map, &mut path, &mut entries);
        }
        Self { entries }
    }

    pub fn from_json(s: &str) -> Result<Self, TranslationError> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&value))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranslationError> {
        let path = path.as_ref();
        let ret = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(entries = ret.len(), path = %path.display(), "loaded translations");
        Ok(ret)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

fn flatten<'v>(
    map: &'v serde_json::Map<String, Value>,
    path: &mut Vec<&'v str>,
    out: &mut HashMap<String, String>,
) {
    for (key, value) in map {
        path.push(key);
        match value {
            Value::String(s) => {
                out.insert(path.join("."), s.clone());
            }
            Value::Object(inner) => flatten(inner, path, out),
            _ => {}
        }
        path.pop();
    }
}

impl Translate for Translations {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

type Loader = fn(&Path) -> Result<Translations, TranslationError>;

/// A translation file read on first use. Concurrent first lookups share a single load; a file
/// that fails to load leaves the table empty.
pub struct LazyTranslations {
    path: PathBuf,
    load: Loader,
    table: OnceLock<Translations>,
}

impl LazyTranslations {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_loader(path, |path: &Path| Translations::load(path))
    }

    /// Reads the table with `load` instead of from the filesystem.
    pub fn with_loader(path: impl Into<PathBuf>, load: Loader) -> Self {
        Self {
            path: path.into(),
            load,
            table: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &Translations {
        self.table.get_or_init(|| match (self.load)(&self.path) {
            Ok(table) => table,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "translations unavailable");
                Translations::default()
            }
        })
    }
}

impl fmt::Debug for LazyTranslations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTranslations")
            .field("path", &self.path)
            .field("table", &self.table)
            .finish()
    }
}

impl Translate for LazyTranslations {
    fn translate(&self, key: &str) -> String {
        self.get().translate(key)
    }
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, key: &str) -> String {
        (**self).translate(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    const TABLE: &str = r#"{
        "PF2E": {
            "Check": {"Reflex": "Reflex save", "Count": 3},
            "Greeting": "Hello"
        },
        "Top": "Level"
    }"#;

    #[test]
    fn test_flatten() {
        let table = Translations::from_json(TABLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.translate("PF2E.Check.Reflex"), "Reflex save");
        assert_eq!(table.translate("PF2E.Greeting"), "Hello");
        assert_eq!(table.translate("Top"), "Level");
    }

    #[test]
    fn test_unknown_key_is_identity() {
        let table = Translations::from_json(TABLE).unwrap();
        assert_eq!(table.translate("PF2E.Check.Count"), "PF2E.Check.Count");
        assert_eq!(Translations::default().translate("PF2E.Missing"), "PF2E.Missing");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Translations::from_json("{"),
            Err(TranslationError::Json(_))
        ));
    }

    #[test]
    fn test_lazy_missing_file() {
        let lazy = LazyTranslations::new("/nonexistent/dice-enrich/en.json");
        assert_eq!(lazy.translate("PF2E.Greeting"), "PF2E.Greeting");
        assert!(lazy.get().is_empty());
    }

    #[test]
    fn test_lazy_loads_once() {
        let path = std::env::temp_dir().join(format!("dice-enrich-i18n-{}.json", std::process::id()));
        std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(TABLE.as_bytes()))
            .unwrap();
        let lazy = LazyTranslations::new(&path);
        assert_eq!(lazy.translate("PF2E.Greeting"), "Hello");

        std::fs::remove_file(&path).unwrap();
        assert_eq!(lazy.translate("Top"), "Level");
    }

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn slow_load(_: &Path) -> Result<Translations, TranslationError> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Translations::from_json(TABLE)
    }

    #[test]
    fn test_lazy_single_load_across_threads() {
        let lazy = LazyTranslations::with_loader("en.json", slow_load);
        let tables: Vec<usize> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| lazy.get() as *const Translations as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
        assert!(tables.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(lazy.translate("PF2E.Greeting"), "Hello");
    }
}
