use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::PlaceLookup;
use crate::Result;
use crate::model::{CityAnchor, Coordinates};
use crate::utils::generate_lookup_cache_key;

/// Memoizes another [`PlaceLookup`], optionally backed by a JSON file.
///
/// Answers are cached per query, anchor and [`PlaceLookup::cache_scope`].
/// Misses live only in memory and are never written to the file. Errors are
/// not cached, so a failed lookup is attempted again next time.
pub struct CachedLookup<L> {
    inner: L,
    entries: RefCell<HashMap<String, Option<Coordinates>>>,
    path: Option<PathBuf>,
}

impl<L: PlaceLookup> CachedLookup<L> {
    pub fn in_memory(inner: L) -> Self {
        Self {
            inner,
            entries: RefCell::new(HashMap::new()),
            path: None,
        }
    }

    /// Load previous answers from `path`. A missing or unreadable file starts empty.
    pub fn with_file(inner: L, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_cache(&path);
        log::debug!(
            "loaded {} cached lookups from {}",
            entries.len(),
            path.display()
        );
        Self {
            inner,
            entries: RefCell::new(entries),
            path: Some(path),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Write the hits back to the cache file, if there is one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries = self.entries.borrow();
        let hits: HashMap<&String, Coordinates> = entries
            .iter()
            .filter_map(|(key, answer)| answer.map(|point| (key, point)))
            .collect();
        let data = serde_json::to_string_pretty(&hits)?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl<L: PlaceLookup> PlaceLookup for CachedLookup<L> {
    fn lookup(&self, query: &str, anchor: &CityAnchor) -> Result<Option<Coordinates>> {
        let key = generate_lookup_cache_key(query, anchor.coordinates(), &self.inner.cache_scope());
        if let Some(&cached) = self.entries.borrow().get(&key) {
            log::trace!("lookup cache hit for {key}");
            return Ok(cached);
        }
        let answer = self.inner.lookup(query, anchor)?;
        self.entries.borrow_mut().insert(key, answer);
        Ok(answer)
    }
}

fn load_cache(path: &Path) -> HashMap<String, Option<Coordinates>> {
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("ignoring corrupt lookup cache {}: {e}", path.display());
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    }
}
