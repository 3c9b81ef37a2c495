//! The rule boundary: predicates, their parameters, and ordered chains.

use crate::datasource::DataSource;
use crate::error::RuleError;
use crate::path;
use crate::value::is_blank;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named, parameterized predicate over a value at a path.
///
/// Implementations hold no mutable state; parameters are fixed when the rule
/// is built. `value` is `None` when the path does not resolve.
#[async_trait(?Send)]
pub trait Rule {
    async fn validate(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError>;

    /// Raw parameter tokens in declaration order.
    fn parameters(&self) -> &[String] {
        &[]
    }
}

// ─── Parameters ─────────────────────────────────────────────────────────────

/// A token is a reference iff it starts with `@`.
pub fn is_reference(token: &str) -> bool {
    token.starts_with('@')
}

/// A parameter token after resolution against the data being validated.
#[derive(Clone, Debug, PartialEq)]
pub enum Param<'a> {
    /// A plain token, used verbatim.
    Literal(&'a str),
    /// The value read through a reference; `None` if the referenced path is
    /// absent.
    Field(Option<Value>),
    /// A wildcard reference that does not line up with the current path.
    /// Rules treat this as "no constraint".
    Unresolvable,
}

impl Param<'_> {
    /// The parameter as a value: literals become strings, unresolvable
    /// references become `None`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Param::Literal(s) => Some(Value::String(s.to_string())),
            Param::Field(value) => value,
            Param::Unresolvable => None,
        }
    }
}

/// Resolves `token` for a rule evaluated at `path`.
///
/// References are read from `data`; wildcard segments in the reference are
/// aligned with the numeric segments of `path` via
/// [`resolve_reference_path`](path::resolve_reference_path).
pub fn resolve_parameter<'a>(token: &'a str, path: &str, data: &dyn DataSource) -> Param<'a> {
    if !is_reference(token) {
        return Param::Literal(token);
    }
    match path::resolve_reference_path(token, path) {
        Some(target) => Param::Field(data.get_value(&target)),
        None => Param::Unresolvable,
    }
}

// ─── Chains ─────────────────────────────────────────────────────────────────

/// A rule together with the name it was declared under.
#[derive(Clone)]
pub struct NamedRule {
    pub name: String,
    pub rule: Arc<dyn Rule>,
}

impl NamedRule {
    pub fn new(name: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

impl fmt::Debug for NamedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedRule")
            .field("name", &self.name)
            .field("parameters", &self.rule.parameters())
            .finish()
    }
}

/// Ordered rules attached to one declared path or pattern.
///
/// Evaluation stops at the first failing rule.
#[derive(Clone, Debug, Default)]
pub struct RuleChain {
    rules: Vec<NamedRule>,
}

impl RuleChain {
    pub fn new(rules: Vec<NamedRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: NamedRule) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, other: &RuleChain) {
        self.rules.extend(other.rules.iter().cloned());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedRule> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every path referenced by a parameter of any rule, `@` stripped, in
    /// declaration order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .flat_map(|r| r.rule.parameters().iter())
            .filter_map(|token| token.strip_prefix('@'))
    }
}

impl<'a> IntoIterator for &'a RuleChain {
    type Item = &'a NamedRule;
    type IntoIter = std::slice::Iter<'a, NamedRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<NamedRule> for RuleChain {
    fn from_iter<I: IntoIterator<Item = NamedRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ─── Closure-backed rules ───────────────────────────────────────────────────

/// Predicate signature for [`FnRule`]: the (non-empty) value, the resolved
/// parameters, the path being validated, and the data it belongs to. An `Err`
/// becomes the message for that path.
pub type Predicate = dyn for<'a> Fn(
    &'a Value,
    &'a [Option<Value>],
    &'a str,
    &'a dyn DataSource,
) -> LocalBoxFuture<'a, Result<bool, String>>;

/// A rule backed by a closure.
///
/// Empty values pass without calling the closure. Every parameter is resolved
/// first, so the closure sees referenced values rather than `@` tokens.
pub struct FnRule {
    name: String,
    predicate: Arc<Predicate>,
    parameters: Vec<String>,
}

impl FnRule {
    pub fn new(
        name: impl Into<String>,
        predicate: Arc<Predicate>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            predicate,
            parameters,
        }
    }
}

#[async_trait(?Send)]
impl Rule for FnRule {
    async fn validate(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        let Some(value) = value.filter(|v| !is_blank(Some(*v))) else {
            return Ok(true);
        };
        let resolved: Vec<Option<Value>> = self
            .parameters
            .iter()
            .map(|token| resolve_parameter(token, path, data).into_value())
            .collect();
        (self.predicate)(value, resolved.as_slice(), path, data)
            .await
            .map_err(|message| RuleError::predicate(&self.name, message))
    }

    fn parameters(&self) -> &[String] {
        &self.parameters
    }
}
