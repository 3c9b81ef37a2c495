//! The validation engine.
//!
//! A [`Validator`] owns parsed rule chains, the dependency graph, and the
//! error maps. Every `validate_*` call takes `&mut self`, so calls on one
//! validator never overlap. Within an aggregate call the per-path evaluations
//! run concurrently against a shared borrow and the error map is written once
//! they have all finished.

use crate::datasource::{DataSource, read_path};
use crate::error::Diagnostic;
use crate::graph::DependencyGraph;
use crate::message::{DefaultMessageFormatter, MessageContext, MessageFormatter};
use crate::parse::{RuleSpec, parse_rules};
use crate::path;
use crate::registry::{RuleFactory, RuleRegistry};
use crate::rule::{NamedRule, RuleChain};
use futures::future::{LocalBoxFuture, join_all};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ─── Options ────────────────────────────────────────────────────────────────

/// Construction options for [`Validator`].
#[derive(Clone, Default)]
pub struct ValidatorOptions {
    /// `"<path>:<rule>"` → message template. Numeric segments may be written
    /// as `*` to cover every element.
    pub custom_messages: IndexMap<String, String>,
    /// `None` uses [`DefaultMessageFormatter`].
    pub formatter: Option<Arc<dyn MessageFormatter>>,
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("custom_messages", &self.custom_messages)
            .field("formatter", &self.formatter.as_ref().map(|_| "custom"))
            .finish()
    }
}

// ─── Validator ──────────────────────────────────────────────────────────────

pub struct Validator {
    registry: RuleRegistry,
    formatter: Arc<dyn MessageFormatter>,
    custom_messages: IndexMap<String, String>,
    rules: IndexMap<String, RuleChain>,
    dependents: DependencyGraph,
    errors: IndexMap<String, Vec<String>>,
    server_errors: IndexMap<String, String>,
}

impl Validator {
    pub fn new(registry: RuleRegistry, options: ValidatorOptions) -> Self {
        Self {
            registry,
            formatter: options
                .formatter
                .unwrap_or_else(|| Arc::new(DefaultMessageFormatter)),
            custom_messages: options.custom_messages,
            rules: IndexMap::new(),
            dependents: DependencyGraph::new(),
            errors: IndexMap::new(),
            server_errors: IndexMap::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn set_message_formatter(&mut self, formatter: Arc<dyn MessageFormatter>) -> &mut Self {
        self.formatter = formatter;
        self
    }

    /// Merges `messages` into the current overrides; later keys win.
    pub fn set_custom_messages<I, K, V>(&mut self, messages: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.custom_messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn custom_messages(&self) -> &IndexMap<String, String> {
        &self.custom_messages
    }

    /// Replaces every rule chain and rebuilds the dependency graph.
    ///
    /// Problems with individual entries are skipped and reported.
    pub fn set_rules<I, K, V>(&mut self, specs: I) -> Vec<Diagnostic>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RuleSpec>,
    {
        let parsed = parse_rules(specs, &self.registry);
        self.rules = parsed.chains;
        self.dependents = DependencyGraph::build(&self.rules);
        tracing::debug!(
            chains = self.rules.len(),
            edges = self.dependents.edge_count(),
            "rules rebuilt"
        );
        parsed.diagnostics
    }

    /// Parsed chains in declaration order.
    pub fn rules(&self) -> &IndexMap<String, RuleChain> {
        &self.rules
    }

    /// Paths linked to `path` through `@` references, in either direction.
    pub fn get_dependent_fields(&self, path: &str) -> Vec<String> {
        self.dependents.dependents(path)
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependents
    }

    // ─── Validation ─────────────────────────────────────────────────────────

    /// Validates one concrete path, replacing its error entry.
    pub async fn validate_path(&mut self, path: &str, data: &dyn DataSource) -> bool {
        if path.is_empty() {
            return true;
        }
        self.errors.shift_remove(path);
        let failure = self.evaluate_path(path, data).await;
        self.record(path, failure)
    }

    /// Validates every concrete path `pattern` expands to in `data`.
    pub async fn validate_pattern(&mut self, pattern: &str, data: &dyn DataSource) -> bool {
        if pattern.is_empty() {
            return true;
        }
        let paths = expand_pattern(pattern, &data.raw_data());
        self.validate_all(paths, data).await
    }

    /// Validates every declared path and pattern.
    pub async fn validate(&mut self, data: &dyn DataSource) -> bool {
        let root = data.raw_data();
        let mut paths = IndexSet::new();
        for key in self.rules.keys() {
            if path::has_wildcard(key) {
                paths.extend(expand_pattern(key, &root));
            } else {
                paths.insert(key.clone());
            }
        }
        self.validate_all(paths, data).await
    }

    /// Validates exactly the given concrete paths.
    pub async fn validate_group<S: AsRef<str>>(
        &mut self,
        data: &dyn DataSource,
        paths: &[S],
    ) -> bool {
        let paths: IndexSet<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        self.validate_all(paths, data).await
    }

    async fn validate_all<I>(&mut self, paths: I, data: &dyn DataSource) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        let paths: Vec<String> = paths.into_iter().filter(|p| !p.is_empty()).collect();
        for path in &paths {
            self.errors.shift_remove(path);
        }

        let this = &*self;
        let failures = join_all(paths.iter().map(|path| this.evaluate_path(path, data))).await;

        let mut valid = true;
        for (path, failure) in paths.iter().zip(failures) {
            valid &= self.record(path, failure);
        }
        valid
    }

    /// Stores the outcome for `path`; returns whether it passed.
    fn record(&mut self, path: &str, failure: Option<String>) -> bool {
        match failure {
            Some(message) => {
                self.errors.insert(path.to_string(), vec![message]);
                false
            }
            None => true,
        }
    }

    /// The exact chain for `path` followed by every other declared key whose
    /// pattern matches it, in declaration order.
    pub fn chain_for(&self, path: &str) -> RuleChain {
        let mut chain = self.rules.get(path).cloned().unwrap_or_default();
        for (key, rules) in &self.rules {
            if key != path && path::matches_pattern(path, key) {
                chain.extend(rules);
            }
        }
        chain
    }

    /// Runs the chain for `path` and returns the message of the first
    /// failing rule.
    async fn evaluate_path(&self, path: &str, data: &dyn DataSource) -> Option<String> {
        let chain = self.chain_for(path);
        if chain.is_empty() {
            return None;
        }

        let value = data.get_value(path);
        for named in &chain {
            match named.rule.validate(value.as_ref(), path, data).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(path, rule = %named.name, "rule failed");
                    return Some(self.format_message(named, value.as_ref(), path).await);
                }
                Err(err) => {
                    tracing::debug!(path, rule = %named.name, error = %err, "rule raised an error");
                    if err.message.is_empty() {
                        return Some(format!("Validation error in rule {}", named.name));
                    }
                    return Some(err.message);
                }
            }
        }
        None
    }

    async fn format_message(&self, named: &NamedRule, value: Option<&Value>, path: &str) -> String {
        let ctx = MessageContext {
            rule_name: &named.name,
            value,
            path,
            parameters: named.rule.parameters(),
            default_message: self.registry.default_message(&named.name),
            custom_messages: &self.custom_messages,
        };
        self.formatter.format(&ctx).await
    }

    // ─── Error state ────────────────────────────────────────────────────────

    /// Local errors with server errors appended per path.
    pub fn get_errors(&self) -> IndexMap<String, Vec<String>> {
        let mut errors = self.errors.clone();
        for (path, message) in &self.server_errors {
            errors.entry(path.clone()).or_default().push(message.clone());
        }
        errors
    }

    pub fn get_errors_for_path(&self, path: &str) -> Vec<String> {
        let mut errors = self.errors.get(path).cloned().unwrap_or_default();
        if let Some(message) = self.server_errors.get(path) {
            errors.push(message.clone());
        }
        errors
    }

    /// Clears local and server errors.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.server_errors.clear();
    }

    pub fn clear_errors_for_path(&mut self, path: &str) {
        self.errors.shift_remove(path);
        self.server_errors.shift_remove(path);
    }

    /// Clears local and server errors for every path `pattern` matches.
    pub fn clear_errors_for_pattern(&mut self, pattern: &str) {
        self.errors
            .retain(|path, _| !path::matches_pattern(path, pattern));
        self.server_errors
            .retain(|path, _| !path::matches_pattern(path, pattern));
    }

    /// Replaces the server errors.
    pub fn set_server_errors<I, K, V>(&mut self, errors: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.server_errors = errors
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    pub fn server_errors(&self) -> &IndexMap<String, String> {
        &self.server_errors
    }

    pub fn clear_server_errors(&mut self) {
        self.server_errors.clear();
    }

    pub fn remove_server_error(&mut self, path: &str) {
        self.server_errors.shift_remove(path);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.server_errors.is_empty()
    }

    pub fn has_errors_for_path(&self, path: &str) -> bool {
        self.errors.contains_key(path) || self.server_errors.contains_key(path)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules)
            .field("custom_messages", &self.custom_messages)
            .field("errors", &self.errors)
            .field("server_errors", &self.server_errors)
            .finish_non_exhaustive()
    }
}

// ─── Pattern expansion ──────────────────────────────────────────────────────

/// Concrete paths `pattern` addresses in `root`, depth-first in data order.
///
/// A `*` segment enumerates the elements of the sequence found there; a
/// missing or empty sequence still yields index `0`, so rules such as
/// `required` fire on elements the document should have. A concrete segment
/// is followed whether or not it exists.
///
/// ```
/// use fieldrules::validate::expand_pattern;
/// use serde_json::json;
///
/// let data = json!({"skills": [{"name": "JS"}, {}]});
/// assert_eq!(
///     expand_pattern("skills.*.name", &data),
///     vec!["skills.0.name", "skills.1.name"]
/// );
/// assert_eq!(expand_pattern("jobs.*.title", &json!({})), vec!["jobs.0.title"]);
/// ```
pub fn expand_pattern(pattern: &str, root: &Value) -> Vec<String> {
    let segments = path::split(pattern);
    if segments.is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut stack: Vec<(String, usize, Option<&Value>)> = vec![(String::new(), 0, Some(root))];

    while let Some((current, depth, node)) = stack.pop() {
        let Some(segment) = segments.get(depth) else {
            found.push(current);
            continue;
        };

        if path::is_wildcard(segment) {
            let items = node.and_then(Value::as_array);
            let len = items.map_or(0, Vec::len).max(1);
            // Reversed so elements pop in index order.
            for index in (0..len).rev() {
                let child = items.and_then(|items| items.get(index));
                stack.push((descend(&current, &index.to_string()), depth + 1, child));
            }
        } else {
            let child = node.and_then(|n| read_path(n, segment));
            stack.push((descend(&current, segment), depth + 1, child));
        }
    }

    tracing::trace!(pattern, count = found.len(), "expanded pattern");
    found
}

fn descend(current: &str, segment: &str) -> String {
    if current.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", current, segment)
    }
}

// ─── Factory ────────────────────────────────────────────────────────────────

/// Builds validators sharing one registry and formatter.
///
/// Starts with every built-in rule registered.
pub struct ValidatorFactory {
    registry: RuleRegistry,
    formatter: Arc<dyn MessageFormatter>,
}

impl Default for ValidatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorFactory {
    pub fn new() -> Self {
        Self::with_formatter(Arc::new(DefaultMessageFormatter))
    }

    pub fn with_formatter(formatter: Arc<dyn MessageFormatter>) -> Self {
        Self {
            registry: RuleRegistry::with_builtins(),
            formatter,
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: RuleFactory,
        default_message: impl Into<String>,
    ) -> &mut Self {
        self.registry.register(name, factory, default_message);
        self
    }

    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        default_message: impl Into<String>,
    ) -> &mut Self
    where
        F: Fn(&Value, &[Option<Value>], &str, &dyn DataSource) -> Result<bool, String> + 'static,
    {
        self.registry.register_fn(name, predicate, default_message);
        self
    }

    pub fn register_async_fn<F>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        default_message: impl Into<String>,
    ) -> &mut Self
    where
        F: for<'a> Fn(
                &'a Value,
                &'a [Option<Value>],
                &'a str,
                &'a dyn DataSource,
            ) -> LocalBoxFuture<'a, Result<bool, String>>
            + 'static,
    {
        self.registry.register_async_fn(name, predicate, default_message);
        self
    }

    /// A validator with `rules` set, plus the diagnostics from parsing them.
    pub fn make<I, K, V>(
        &self,
        rules: I,
        custom_messages: IndexMap<String, String>,
    ) -> (Validator, Vec<Diagnostic>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RuleSpec>,
    {
        let mut validator = Validator::new(
            self.registry.clone(),
            ValidatorOptions {
                custom_messages,
                formatter: Some(Arc::clone(&self.formatter)),
            },
        );
        let diagnostics = validator.set_rules(rules);
        (validator, diagnostics)
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
