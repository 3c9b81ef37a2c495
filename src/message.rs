//! Error message formatting.
//!
//! A formatter receives everything it needs through [`MessageContext`]; it
//! never reaches back into the validator.

use crate::path;
use crate::value::display_value;
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

/// Used when neither an override nor a registered default exists.
pub const FALLBACK_MESSAGE: &str = "Validation failed";

static PARAM_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{param:(\d+)\}").unwrap());

/// Inputs for formatting one failed rule.
#[derive(Clone, Copy, Debug)]
pub struct MessageContext<'a> {
    pub rule_name: &'a str,
    /// `None` when the path was absent.
    pub value: Option<&'a Value>,
    pub path: &'a str,
    /// Raw parameter tokens of the failing rule.
    pub parameters: &'a [String],
    /// The rule's registered default template.
    pub default_message: Option<&'a str>,
    /// `"<path>:<rule>"` → template overrides.
    pub custom_messages: &'a IndexMap<String, String>,
}

/// Turns a failed rule into a user-facing message. May suspend.
#[async_trait(?Send)]
pub trait MessageFormatter {
    async fn format(&self, ctx: &MessageContext<'_>) -> String;
}

#[async_trait(?Send)]
impl<F> MessageFormatter for F
where
    F: Fn(&MessageContext<'_>) -> String,
{
    async fn format(&self, ctx: &MessageContext<'_>) -> String {
        self(ctx)
    }
}

/// Picks an override or the default template and fills in its placeholders.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMessageFormatter;

#[async_trait(?Send)]
impl MessageFormatter for DefaultMessageFormatter {
    async fn format(&self, ctx: &MessageContext<'_>) -> String {
        let template = custom_message(ctx.custom_messages, ctx.path, ctx.rule_name)
            .or(ctx.default_message)
            .unwrap_or(FALLBACK_MESSAGE);
        render_template(template, ctx)
    }
}

/// Looks up `"<path>:<rule>"`, then the same key with every numeric segment
/// replaced by `*`. Empty templates are skipped.
pub fn custom_message<'m>(
    messages: &'m IndexMap<String, String>,
    path: &str,
    rule_name: &str,
) -> Option<&'m str> {
    let lookup = |key: String| {
        messages
            .get(&key)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    };

    lookup(format!("{}:{}", path, rule_name))
        .or_else(|| lookup(format!("{}:{}", path::wildcard_indices(path), rule_name)))
}

/// Substitutes `{value}`, then `{param:N}`, then `{field}`.
///
/// A reference parameter renders as the referenced path without its `@`; a
/// missing or empty parameter renders as nothing.
pub fn render_template(template: &str, ctx: &MessageContext<'_>) -> String {
    let message = template.replace("{value}", &display_value(ctx.value));

    let message = PARAM_PLACEHOLDER_RE.replace_all(&message, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| ctx.parameters.get(i))
            .map(|token| token.strip_prefix('@').unwrap_or(token).to_string())
            .unwrap_or_default()
    });

    message.replace("{field}", ctx.path)
}
