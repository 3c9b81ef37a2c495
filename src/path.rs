//! Path algebra over dot-separated addresses.
//!
//! A path is a string of segments joined by `.`. A segment made only of ASCII
//! digits addresses a sequence element; a segment equal to `*` matches any key
//! or index at that depth. No path object is ever built: every operation
//! re-derives segments from the string.

use regex::Regex;
use std::sync::LazyLock;

/// The wildcard segment.
pub const WILDCARD: &str = "*";

static BRACKET_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\]").unwrap());

// ─── Segments ───────────────────────────────────────────────────────────────

/// A path is valid iff it is non-empty.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
}

/// Returns `true` for segments matching `^\d+$`.
pub fn is_numeric_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` for the `*` segment.
pub fn is_wildcard(segment: &str) -> bool {
    segment == WILDCARD
}

/// Returns `true` if any segment of `path` is a wildcard.
pub fn has_wildcard(path: &str) -> bool {
    split(path).into_iter().any(is_wildcard)
}

/// Splits a path on `.`. The empty path has zero segments.
pub fn split(path: &str) -> Vec<&str> {
    if !is_valid_path(path) {
        return Vec::new();
    }
    path.split('.').collect()
}

/// Joins segments with `.`. Joining nothing yields `""`.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Re-joins the segments of `path`. A no-op on already-normalized paths.
pub fn normalize(path: &str) -> String {
    join(&split(path))
}

/// Everything before the last `.`, or `None` for top-level and empty paths.
pub fn parent(path: &str) -> Option<&str> {
    if !is_valid_path(path) {
        return None;
    }
    path.rfind('.').map(|pos| &path[..pos])
}

/// Index addressed by the final segment of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayIndex {
    Index(usize),
    Wildcard,
}

/// Splits `items.3` into `("items", Index(3))` and `items.*` into
/// `("items", Wildcard)`. Returns `None` when the last segment is a plain key
/// or the path has a single segment.
pub fn array_info(path: &str) -> Option<(&str, ArrayIndex)> {
    let pos = path.rfind('.')?;
    let (head, last) = (&path[..pos], &path[pos + 1..]);
    if is_wildcard(last) {
        return Some((head, ArrayIndex::Wildcard));
    }
    if is_numeric_segment(last) {
        return last.parse().ok().map(|i| (head, ArrayIndex::Index(i)));
    }
    None
}

// ─── Pattern matching ───────────────────────────────────────────────────────

/// Segment-wise prefix match with wildcards.
///
/// `pattern` matches `path` iff it has no more segments than `path` and every
/// non-wildcard pattern segment equals the path segment at the same index.
pub fn matches_pattern(path: &str, pattern: &str) -> bool {
    let path_segments = split(path);
    let pattern_segments = split(pattern);

    if pattern_segments.len() > path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(path_segments.iter())
        .all(|(pat, seg)| is_wildcard(pat) || pat == seg)
}

// ─── Bracket notation ───────────────────────────────────────────────────────

/// `items[0].name` → `items.0.name`.
pub fn bracket_to_dot(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    BRACKET_SEGMENT_RE.replace_all(path, ".$1").into_owned()
}

/// `items.0.name` → `items[0].name`. The first segment is kept verbatim.
pub fn dot_to_bracket(path: &str) -> String {
    let segments = split(path);
    let Some((first, rest)) = segments.split_first() else {
        return String::new();
    };

    let mut out = (*first).to_string();
    for segment in rest {
        if is_numeric_segment(segment) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(segment);
        }
    }
    out
}

// ─── Reference resolution ───────────────────────────────────────────────────

/// Resolves an `@`-prefixed reference relative to the path being validated.
///
/// A reference without wildcards is returned as-is. Otherwise every segment
/// before the first `*` must equal the segment of `current_path` at the same
/// index, or the reference is unresolvable (`None`). The n-th `*` is then
/// replaced by the n-th numeric segment of `current_path`; a `*` with no
/// counterpart stays `*`.
///
/// ```
/// use fieldrules::path::resolve_reference_path;
///
/// assert_eq!(
///     resolve_reference_path("@jobs.*.current", "jobs.2.end_date"),
///     Some("jobs.2.current".to_string())
/// );
/// assert_eq!(resolve_reference_path("@skills.*.x", "jobs.2.level"), None);
/// ```
pub fn resolve_reference_path(reference: &str, current_path: &str) -> Option<String> {
    let stripped = reference.strip_prefix('@').unwrap_or(reference);
    let reference_segments = split(stripped);
    let current_segments = split(current_path);

    let Some(prefix_len) = reference_segments.iter().position(|s| is_wildcard(s)) else {
        return Some(join(&reference_segments));
    };

    for (i, segment) in reference_segments[..prefix_len].iter().enumerate() {
        if current_segments.get(i) != Some(segment) {
            return None;
        }
    }

    let indices: Vec<&str> = current_segments
        .iter()
        .copied()
        .filter(|s| is_numeric_segment(s))
        .collect();

    let mut wildcards_seen = 0;
    let resolved: Vec<&str> = reference_segments
        .iter()
        .map(|segment| {
            if !is_wildcard(segment) {
                return *segment;
            }
            let substitute = indices.get(wildcards_seen).copied().unwrap_or(WILDCARD);
            wildcards_seen += 1;
            substitute
        })
        .collect();

    Some(join(&resolved))
}

/// Replaces every numeric segment with `*`: `items.1.price` → `items.*.price`.
pub fn wildcard_indices(path: &str) -> String {
    let segments: Vec<&str> = split(path)
        .into_iter()
        .map(|s| if is_numeric_segment(s) { WILDCARD } else { s })
        .collect();
    join(&segments)
}
