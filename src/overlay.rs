//! Uncommitted edits layered over a base [`DataSource`].

use crate::datasource::{DataSource, write_path};
use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;

/// Holds pending writes keyed by path in front of a base data source.
///
/// Reads consult the pending entries first and fall back to the base. Writes
/// only touch the pending map; the base changes on [`commit`](Self::commit)
/// and [`commit_all`](Self::commit_all), and when removing a path that has no
/// pending entry.
///
/// `B` may be an owned source or a borrow (`&mut PlainDataSource`), so an
/// overlay can be laid over data the caller keeps.
///
/// ```
/// use fieldrules::{DataSource, PlainDataSource, TentativeOverlay};
/// use serde_json::json;
///
/// let mut base = PlainDataSource::new(json!({"a": {"b": 0}}));
/// let mut overlay = TentativeOverlay::new(&mut base);
/// overlay.set_value("a.b", json!(1));
/// assert_eq!(overlay.get_value("a.b"), Some(json!(1)));
/// assert!(overlay.commit("a.b"));
/// assert!(!overlay.has_tentative_value("a.b"));
/// assert_eq!(base.get_value("a.b"), Some(json!(1)));
/// ```
#[derive(Debug)]
pub struct TentativeOverlay<B: DataSource> {
    base: B,
    pending: IndexMap<String, Value>,
}

impl<B: DataSource> TentativeOverlay<B> {
    pub fn new(base: B) -> Self {
        Self::with_pending(base, IndexMap::new())
    }

    pub fn with_pending(base: B, pending: IndexMap<String, Value>) -> Self {
        Self { base, pending }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    /// Drops the pending entries and hands back the base.
    pub fn into_base(self) -> B {
        self.base
    }

    pub fn has_tentative_value(&self, path: &str) -> bool {
        self.pending.contains_key(path)
    }

    pub fn tentative_value(&self, path: &str) -> Option<&Value> {
        self.pending.get(path)
    }

    /// Snapshot of every pending entry in write order.
    pub fn tentative_values(&self) -> IndexMap<String, Value> {
        self.pending.clone()
    }

    /// Moves the pending entry for `path` into the base.
    ///
    /// Returns `false` (and does nothing) when `path` has no pending entry.
    pub fn commit(&mut self, path: &str) -> bool {
        match self.pending.shift_remove(path) {
            Some(value) => {
                self.base.set_value(path, value);
                true
            }
            None => false,
        }
    }

    /// Flushes every pending entry into the base in write order.
    pub fn commit_all(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        tracing::trace!(count = pending.len(), "committing tentative values");
        for (path, value) in pending {
            self.base.set_value(&path, value);
        }
    }
}

impl<B: DataSource> DataSource for TentativeOverlay<B> {
    fn get_value(&self, path: &str) -> Option<Value> {
        match self.pending.get(path) {
            Some(value) => Some(value.clone()),
            None => self.base.get_value(path),
        }
    }

    fn set_value(&mut self, path: &str, value: Value) {
        self.pending.insert(path.to_string(), value);
    }

    fn has_path(&self, path: &str) -> bool {
        self.pending.contains_key(path) || self.base.has_path(path)
    }

    fn remove_path(&mut self, path: &str) {
        if self.pending.shift_remove(path).is_none() {
            self.base.remove_path(path);
        }
    }

    /// Base tree with every pending entry written in, creating intermediate
    /// containers where an entry reaches below the existing structure.
    fn raw_data(&self) -> Cow<'_, Value> {
        let mut merged = self.base.raw_data().into_owned();
        for (path, value) in &self.pending {
            write_path(&mut merged, path, value.clone());
        }
        Cow::Owned(merged)
    }

    fn clone_source(&self) -> Box<dyn DataSource> {
        Box::new(TentativeOverlay {
            base: self.base.clone_source(),
            pending: self.pending.clone(),
        })
    }
}
