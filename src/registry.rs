//! Rule lookup by name.

use crate::datasource::DataSource;
use crate::enums::RuleKind;
use crate::rule::{FnRule, Predicate, Rule};
use crate::rules::BuiltinRule;
use futures::future::{self, LocalBoxFuture};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Builds a rule from its raw parameter tokens.
pub type RuleFactory = Arc<dyn Fn(&[String]) -> Arc<dyn Rule>>;

struct Registration {
    factory: RuleFactory,
    default_message: String,
}

/// Maps rule names to a factory and a default message template.
///
/// Registering a name twice replaces the earlier registration.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    entries: IndexMap<String, Arc<Registration>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`RuleKind`] under its name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in RuleKind::ALL {
            registry.register(
                kind.as_str(),
                Arc::new(move |params: &[String]| {
                    Arc::new(BuiltinRule::new(kind, params.to_vec())) as Arc<dyn Rule>
                }),
                kind.default_message(),
            );
        }
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: RuleFactory,
        default_message: impl Into<String>,
    ) -> &mut Self {
        self.entries.insert(
            name.into(),
            Arc::new(Registration {
                factory,
                default_message: default_message.into(),
            }),
        );
        self
    }

    /// Registers a closure-backed rule; see [`FnRule`].
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        default_message: impl Into<String>,
    ) -> &mut Self
    where
        F: Fn(&Value, &[Option<Value>], &str, &dyn DataSource) -> Result<bool, String> + 'static,
    {
        self.register_async_fn(
            name,
            move |value, params, path, data| {
                Box::pin(future::ready(predicate(value, params, path, data)))
            },
            default_message,
        )
    }

    /// Registers a closure-backed rule whose check may suspend.
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
        let name = name.into();
        let rule_name = name.clone();
        let predicate: Arc<Predicate> = Arc::new(predicate);
        self.register(
            name,
            Arc::new(move |params: &[String]| {
                Arc::new(FnRule::new(
                    rule_name.as_str(),
                    Arc::clone(&predicate),
                    params.to_vec(),
                )) as Arc<dyn Rule>
            }),
            default_message,
        )
    }

    /// Builds the rule registered as `name`, or `None` if unknown.
    pub fn get(&self, name: &str, params: &[String]) -> Option<Arc<dyn Rule>> {
        self.entries.get(name).map(|entry| (entry.factory)(params))
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn default_message(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(|entry| entry.default_message.as_str())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
