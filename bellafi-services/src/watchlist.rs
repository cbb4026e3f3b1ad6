//! Watchlist
//!
//! The ordered, deduplicated set of asset ids the user is tracking.

use bellafi_core::normalize_id;
use indexmap::IndexSet;
use tracing::debug;

/// Entries the watchlist starts with
pub const DEFAULT_SEED: [&str; 2] = ["bitcoin", "ethereum"];

/// Ordered set of tracked asset ids
///
/// Each id appears at most once; insertion order is display order. Ids are
/// not validated against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    ids: IndexSet<String>,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl Watchlist {
    /// Create an empty watchlist
    pub fn new() -> Self {
        Self {
            ids: IndexSet::new(),
        }
    }

    /// Create a watchlist from seed entries (normalized and deduplicated)
    pub fn with_seed<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut watchlist = Self::new();
        for id in seed {
            watchlist.add(id.as_ref());
        }
        watchlist
    }

    /// Track an asset
    ///
    /// The input is trimmed and lowercased. Returns `false` without
    /// changing anything if the result is empty or already tracked.
    pub fn add(&mut self, raw_input: &str) -> bool {
        let id = normalize_id(raw_input);
        if id.is_empty() {
            return false;
        }

        let added = self.ids.insert(id);
        if added {
            debug!("Watchlist now tracks {} assets", self.ids.len());
        }
        added
    }

    /// Stop tracking an asset, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> bool {
        let id = normalize_id(id);
        self.ids.shift_remove(&id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Tracked ids in display order
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
