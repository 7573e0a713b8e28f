//! # Favorites
//!
//! An observable set of catalog entries. Listeners registered with
//! [`FavoritesStore::subscribe`] receive the full new list after every
//! effective change; adding an existing favorite or removing a missing one
//! notifies nobody.
//!
//! Favorites persist as a list of calculator paths under
//! [`FAVORITES_KEY`]. Paths that no longer exist in the catalog are dropped
//! on load.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use calc_core::catalog;
//! use calc_core::favorites::FavoritesStore;
//! use calc_core::storage::MemoryStore;
//!
//! let mut favorites = FavoritesStore::open(MemoryStore::new());
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! let id = favorites.subscribe(move |list| sink.set(list.len()));
//!
//! favorites.add(catalog::lookup("/calculators/health/bmi")?)?;
//! assert_eq!(seen.get(), 1);
//! assert!(favorites.unsubscribe(id));
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CalculatorInfo};
use crate::errors::CalcResult;
use crate::storage::{decode, encode, KeyValueStore};

/// Storage key for the persisted favorites
pub const FAVORITES_KEY: &str = "calcuMasterFavorites";

/// Callback invoked with the new favorites list
pub type Listener = Box<dyn Fn(&[&'static CalculatorInfo])>;

/// Handle returned by [`FavoritesStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Favorites over a key-value backend.
pub struct FavoritesStore<S: KeyValueStore> {
    backend: S,
    items: Vec<&'static CalculatorInfo>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load persisted favorites from `backend`.
    pub fn open(backend: S) -> Self {
        let items = match load_paths(&backend) {
            Ok(paths) => {
                let known: Vec<_> = paths.iter().filter_map(|p| catalog::find(p)).collect();
                if known.len() < paths.len() {
                    tracing::debug!(dropped = paths.len() - known.len(), "dropped unknown favorites");
                }
                dedup(known)
            }
            Err(e) => {
                tracing::warn!(key = FAVORITES_KEY, error = %e, "could not load favorites, starting empty");
                Vec::new()
            }
        };

        FavoritesStore {
            backend,
            items,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a calculator. Returns `false` if it was already a favorite.
    pub fn add(&mut self, item: &'static CalculatorInfo) -> CalcResult<bool> {
        if self.contains(item.path) {
            return Ok(false);
        }
        self.items.push(item);
        self.dispatch()?;
        Ok(true)
    }

    /// Remove by path. Returns `false` if it was not a favorite.
    pub fn remove(&mut self, path: &str) -> CalcResult<bool> {
        let before = self.items.len();
        self.items.retain(|c| c.path != path);
        if self.items.len() == before {
            return Ok(false);
        }
        self.dispatch()?;
        Ok(true)
    }

    /// Add if absent, remove if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, item: &'static CalculatorInfo) -> CalcResult<bool> {
        if self.contains(item.path) {
            self.remove(item.path)?;
            Ok(false)
        } else {
            self.add(item)?;
            Ok(true)
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.iter().any(|c| c.path == path)
    }

    /// Favorites in the order they were added.
    pub fn list(&self) -> &[&'static CalculatorInfo] {
        &self.items
    }

    /// Register a listener for future changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&[&'static CalculatorInfo]) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() < before
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Notify listeners, then persist.
    fn dispatch(&mut self) -> CalcResult<()> {
        for (_, listener) in &self.listeners {
            listener(self.items.as_slice());
        }
        let paths: Vec<&str> = self.items.iter().map(|c| c.path).collect();
        let raw = encode(&paths)?;
        self.backend.set(FAVORITES_KEY, &raw).inspect_err(|e| {
            tracing::error!(key = FAVORITES_KEY, error = %e, "failed to persist favorites");
        })
    }
}

fn load_paths<S: KeyValueStore>(backend: &S) -> CalcResult<Vec<String>> {
    match backend.get(FAVORITES_KEY)? {
        Some(raw) => decode(&raw),
        None => Ok(Vec::new()),
    }
}

fn dedup(items: Vec<&'static CalculatorInfo>) -> Vec<&'static CalculatorInfo> {
    let mut unique: Vec<&'static CalculatorInfo> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|c| c.path == item.path) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bmi() -> &'static CalculatorInfo {
        catalog::find("/calculators/health/bmi").unwrap()
    }

    fn tip() -> &'static CalculatorInfo {
        catalog::find("/calculators/misc/tip").unwrap()
    }

    fn recorder(store: &mut FavoritesStore<MemoryStore>) -> (SubscriptionId, Rc<RefCell<Vec<Vec<&'static str>>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let id = store.subscribe(move |list| {
            sink.borrow_mut().push(list.iter().map(|c| c.path).collect());
        });
        (id, calls)
    }

    #[test]
    fn test_add_remove_contains() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        assert!(favorites.add(bmi()).unwrap());
        assert!(favorites.add(tip()).unwrap());
        assert!(favorites.contains("/calculators/health/bmi"));
        assert_eq!(favorites.list().len(), 2);

        assert!(favorites.remove("/calculators/health/bmi").unwrap());
        assert!(!favorites.contains("/calculators/health/bmi"));
        assert!(!favorites.remove("/calculators/health/bmi").unwrap());
    }

    #[test]
    fn test_listeners_see_each_effective_change() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        let (_, calls) = recorder(&mut favorites);

        favorites.add(bmi()).unwrap();
        favorites.add(bmi()).unwrap();
        favorites.add(tip()).unwrap();
        favorites.remove("/calculators/misc/nope").unwrap();
        favorites.remove("/calculators/health/bmi").unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], vec!["/calculators/health/bmi", "/calculators/misc/tip"]);
        assert_eq!(calls[2], vec!["/calculators/misc/tip"]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        let (id, calls) = recorder(&mut favorites);
        let (_, other) = recorder(&mut favorites);

        favorites.add(bmi()).unwrap();
        assert!(favorites.unsubscribe(id));
        assert!(!favorites.unsubscribe(id));
        favorites.add(tip()).unwrap();

        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(other.borrow().len(), 2);
    }

    #[test]
    fn test_toggle() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        assert!(favorites.toggle(bmi()).unwrap());
        assert!(!favorites.toggle(bmi()).unwrap());
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn test_persisted_as_paths() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        favorites.add(tip()).unwrap();
        let backend = favorites.into_backend();

        let raw = backend.get(FAVORITES_KEY).unwrap().unwrap();
        let paths: Vec<String> = decode(&raw).unwrap();
        assert_eq!(paths, vec!["/calculators/misc/tip"]);

        let reloaded = FavoritesStore::open(backend);
        assert_eq!(reloaded.list(), &[tip()]);
    }

    #[test]
    fn test_unknown_and_duplicate_paths_dropped_on_load() {
        let mut backend = MemoryStore::new();
        let stored = vec!["/calculators/misc/tip", "/calculators/gone", "/calculators/misc/tip"];
        backend.set(FAVORITES_KEY, &encode(&stored).unwrap()).unwrap();

        let favorites = FavoritesStore::open(backend);
        assert_eq!(favorites.list(), &[tip()]);
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let mut backend = MemoryStore::new();
        backend.set(FAVORITES_KEY, "[\"/calculators/misc/tip\"]").unwrap();
        let favorites = FavoritesStore::open(backend);
        assert!(favorites.list().is_empty());
    }
}
