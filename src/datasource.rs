//! Read/write access to nested value trees by path.
//!
//! Navigation never fails loudly: a missing key, an out-of-range index, or a
//! segment that addresses the wrong kind of container reads as absent, and
//! writes or removals along such a path are silently skipped (writes create
//! what they need instead). Partially filled documents therefore validate
//! without errors from the access layer.
//!
//! A write never pads a sequence by more than [`MAX_INDEX_GAP`] elements; a
//! path whose index lies further past the end is skipped as a whole.

use crate::path;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// How far past the end of a sequence a write may place an element.
pub const MAX_INDEX_GAP: usize = 10_000;

/// Uniform access to a nested value tree.
pub trait DataSource {
    /// Value at `path`, or `None` if any segment fails to resolve.
    /// The empty path returns the whole tree.
    fn get_value(&self, path: &str) -> Option<Value>;

    /// Writes `value` at `path`, creating or replacing intermediate
    /// containers. Sequence vs map is chosen by whether the following segment
    /// is numeric. The empty path replaces the tree only with a map or
    /// sequence. Indices more than [`MAX_INDEX_GAP`] past the end of their
    /// sequence make the write a no-op.
    fn set_value(&mut self, path: &str, value: Value);

    /// `true` iff [`get_value`](Self::get_value) resolves. The empty path
    /// always resolves.
    fn has_path(&self, path: &str) -> bool {
        path.is_empty() || self.get_value(path).is_some()
    }

    /// Deletes the final segment from its parent container. Sequence elements
    /// after the removed index shift down.
    fn remove_path(&mut self, path: &str);

    /// The underlying tree.
    fn raw_data(&self) -> Cow<'_, Value>;

    /// Deep, independent copy.
    fn clone_source(&self) -> Box<dyn DataSource>;
}

impl<T: DataSource + ?Sized> DataSource for &mut T {
    fn get_value(&self, path: &str) -> Option<Value> {
        (**self).get_value(path)
    }

    fn set_value(&mut self, path: &str, value: Value) {
        (**self).set_value(path, value)
    }

    fn has_path(&self, path: &str) -> bool {
        (**self).has_path(path)
    }

    fn remove_path(&mut self, path: &str) {
        (**self).remove_path(path)
    }

    fn raw_data(&self) -> Cow<'_, Value> {
        (**self).raw_data()
    }

    fn clone_source(&self) -> Box<dyn DataSource> {
        (**self).clone_source()
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn get_value(&self, path: &str) -> Option<Value> {
        (**self).get_value(path)
    }

    fn set_value(&mut self, path: &str, value: Value) {
        (**self).set_value(path, value)
    }

    fn has_path(&self, path: &str) -> bool {
        (**self).has_path(path)
    }

    fn remove_path(&mut self, path: &str) {
        (**self).remove_path(path)
    }

    fn raw_data(&self) -> Cow<'_, Value> {
        (**self).raw_data()
    }

    fn clone_source(&self) -> Box<dyn DataSource> {
        (**self).clone_source()
    }
}

// ─── PlainDataSource ────────────────────────────────────────────────────────

/// A [`DataSource`] over an owned [`Value`] tree of maps and sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct PlainDataSource {
    root: Value,
}

impl PlainDataSource {
    /// Wraps `root`. A `null` root becomes an empty map.
    pub fn new(root: Value) -> Self {
        let root = if root.is_null() {
            Value::Object(Map::new())
        } else {
            root
        };
        Self { root }
    }

    pub fn into_inner(self) -> Value {
        self.root
    }
}

impl Default for PlainDataSource {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl From<Value> for PlainDataSource {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

impl DataSource for PlainDataSource {
    fn get_value(&self, path: &str) -> Option<Value> {
        read_path(&self.root, path).cloned()
    }

    fn set_value(&mut self, path: &str, value: Value) {
        write_path(&mut self.root, path, value);
    }

    fn remove_path(&mut self, path: &str) {
        remove_at(&mut self.root, path);
    }

    fn raw_data(&self) -> Cow<'_, Value> {
        Cow::Borrowed(&self.root)
    }

    fn clone_source(&self) -> Box<dyn DataSource> {
        Box::new(self.clone())
    }
}

// ─── Tree navigation ────────────────────────────────────────────────────────

/// Borrowing read of `path` inside `root`.
pub fn read_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path::split(path) {
        current = child(current, segment)?;
    }
    Some(current)
}

fn child<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    if path::is_numeric_segment(segment) {
        let index: usize = segment.parse().ok()?;
        container.as_array()?.get(index)
    } else {
        container.as_object()?.get(segment)
    }
}

fn child_mut<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if path::is_numeric_segment(segment) {
        let index: usize = segment.parse().ok()?;
        container.as_array_mut()?.get_mut(index)
    } else {
        container.as_object_mut()?.get_mut(segment)
    }
}

/// Writes `value` at `path` inside `root`; see [`DataSource::set_value`].
pub fn write_path(root: &mut Value, path: &str, value: Value) {
    let segments = path::split(path);
    let Some((last, parents)) = segments.split_last() else {
        if value.is_object() || value.is_array() {
            *root = value;
        }
        return;
    };
    if !writable(root, &segments) {
        tracing::trace!(path, "write skipped; index out of reach");
        return;
    }

    let mut current = root;
    for segment in parents {
        current = match slot(current, segment) {
            Some(next) => next,
            None => return,
        };
    }

    if let Some(target) = slot(current, last) {
        *target = value;
    }
}

/// Every numeric segment parses and lies within [`MAX_INDEX_GAP`] of the
/// end of the sequence currently at that depth (empty if there is none).
fn writable(root: &Value, segments: &[&str]) -> bool {
    let mut current = Some(root);
    for segment in segments {
        if path::is_numeric_segment(segment) {
            let Ok(index) = segment.parse::<usize>() else {
                return false;
            };
            let len = current.and_then(Value::as_array).map_or(0, Vec::len);
            if index > len.saturating_add(MAX_INDEX_GAP) {
                return false;
            }
        }
        current = current.and_then(|node| child(node, segment));
    }
    true
}

/// The child slot for `segment`, reshaping `container` into a sequence
/// (padded with `null` up to the index) or a map as the segment demands.
fn slot<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if path::is_numeric_segment(segment) {
        let index: usize = segment.parse().ok()?;
        if !container.is_array() {
            *container = Value::Array(Vec::new());
        }
        let items = container.as_array_mut()?;
        let needed = index.checked_add(1)?;
        if items.len() < needed {
            items.resize(needed, Value::Null);
        }
        items.get_mut(index)
    } else {
        if !container.is_object() {
            *container = Value::Object(Map::new());
        }
        let map = container.as_object_mut()?;
        Some(map.entry(segment).or_insert(Value::Null))
    }
}

fn remove_at(root: &mut Value, path: &str) {
    let segments = path::split(path);
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = match child_mut(current, segment) {
            Some(next) => next,
            None => return,
        };
    }

    if path::is_numeric_segment(last) {
        if let (Some(items), Ok(index)) = (current.as_array_mut(), last.parse::<usize>())
            && index < items.len()
        {
            items.remove(index);
        }
    } else if let Some(map) = current.as_object_mut() {
        map.shift_remove(*last);
    }
}
