use crate::error::{Diagnostic, ParseError, ParseErrorKind};
use crate::registry::RuleRegistry;
use crate::rule::{NamedRule, RuleChain};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unknown rule name.
pub const W_UNKNOWN_RULE: &str = "W-001";
/// Rule entry that cannot be used.
pub const W_UNUSABLE_ENTRY: &str = "W-002";

// ─── Rule specs ─────────────────────────────────────────────────────────────

/// The rules declared for one path or pattern.
#[derive(Clone, Debug)]
pub enum RuleSpec {
    /// Pipe-delimited rule string: `"required|min_length:3"`.
    Rules(String),
    /// Already-built rules, used as given.
    Chain(Vec<NamedRule>),
}

impl From<&str> for RuleSpec {
    fn from(rules: &str) -> Self {
        RuleSpec::Rules(rules.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(rules: String) -> Self {
        RuleSpec::Rules(rules)
    }
}

impl From<Vec<NamedRule>> for RuleSpec {
    fn from(rules: Vec<NamedRule>) -> Self {
        RuleSpec::Chain(rules)
    }
}

impl From<RuleChain> for RuleSpec {
    fn from(chain: RuleChain) -> Self {
        RuleSpec::Chain(chain.iter().cloned().collect())
    }
}

impl From<RuleSource> for RuleSpec {
    fn from(source: RuleSource) -> Self {
        match source {
            RuleSource::Text(rules) => RuleSpec::Rules(rules),
            RuleSource::List(rules) => RuleSpec::Rules(rules.join("|")),
        }
    }
}

/// Rule chains keyed by declared path, in declaration order, plus whatever
/// was skipped along the way.
#[derive(Clone, Debug, Default)]
pub struct ParsedRules {
    pub chains: IndexMap<String, RuleChain>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds a chain per declared path.
///
/// Unknown rule names are dropped with a warning; an entry left with no
/// usable rules is kept as an empty chain. A pre-built list with no rules is
/// kept too, but reported.
pub fn parse_rules<I, K, V>(specs: I, registry: &RuleRegistry) -> ParsedRules
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RuleSpec>,
{
    let mut parsed = ParsedRules::default();

    for (path, spec) in specs {
        let path = path.into();
        match spec.into() {
            RuleSpec::Rules(rules) => {
                let chain = parse_rule_string(&path, &rules, registry, &mut parsed.diagnostics);
                parsed.chains.insert(path, chain);
            }
            RuleSpec::Chain(rules) => {
                if rules.is_empty() {
                    tracing::warn!(path = %path, "rule list without rules");
                    parsed.diagnostics.push(Diagnostic::warning(
                        W_UNUSABLE_ENTRY,
                        &path,
                        "rule list contains no named rules".to_string(),
                    ));
                }
                parsed.chains.insert(path, RuleChain::new(rules));
            }
        }
    }

    parsed
}

/// Parses `"name:p1,p2|name2"` into a chain.
///
/// Each entry splits on its first `:`; everything after it splits on `,`
/// into raw parameter tokens. Blank entries are ignored.
pub fn parse_rule_string(
    path: &str,
    rules: &str,
    registry: &RuleRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> RuleChain {
    let mut chain = RuleChain::default();

    for entry in rules.split('|') {
        if entry.trim().is_empty() {
            continue;
        }

        let (name, params) = match entry.split_once(':') {
            Some((name, raw)) => (name.trim(), split_params(raw)),
            None => (entry.trim(), Vec::new()),
        };

        match registry.get(name, &params) {
            Some(rule) => chain.push(NamedRule::new(name, rule)),
            None => {
                tracing::warn!(path = %path, rule = %name, "unknown rule skipped");
                diagnostics.push(Diagnostic::warning(
                    W_UNKNOWN_RULE,
                    path,
                    format!("unknown rule: {}", name),
                ));
            }
        }
    }

    chain
}

fn split_params(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

// ─── Configuration documents ────────────────────────────────────────────────

/// Rules for one path in a configuration document: a rule string or a list
/// of rule entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSource {
    Text(String),
    List(Vec<String>),
}

/// Rule specs and message overrides kept in a YAML or JSON document.
///
/// ```yaml
/// rules:
///   email: required|email
///   skills.*.name: [required, "min_length:2"]
/// messages:
///   skills.*.name:required: Every skill needs a name
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub rules: IndexMap<String, RuleSource>,
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

/// Reads a [`ValidatorConfig`] from YAML (JSON is accepted as a subset).
pub fn parse_config(input: &str) -> Result<ValidatorConfig, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            kind: ParseErrorKind::Syntax,
            message: "empty input".to_string(),
            path: None,
        });
    }

    let value: serde_json::Value = serde_saphyr::from_str(input).map_err(|e| ParseError {
        kind: ParseErrorKind::Syntax,
        message: e.to_string(),
        path: None,
    })?;

    let Some(root) = value.as_object() else {
        return Err(ParseError {
            kind: ParseErrorKind::TypeMismatch,
            message: "document root must be a mapping".to_string(),
            path: None,
        });
    };

    for (key, section) in root {
        match key.as_str() {
            "rules" | "messages" => {
                if !section.is_object() && !section.is_null() {
                    return Err(ParseError {
                        kind: ParseErrorKind::TypeMismatch,
                        message: format!("{} must be a mapping", key),
                        path: Some(key.clone()),
                    });
                }
            }
            other => {
                return Err(ParseError {
                    kind: ParseErrorKind::TypeMismatch,
                    message: format!("unknown top-level field: {}", other),
                    path: Some(other.to_string()),
                });
            }
        }
    }

    let mut root = root.clone();
    root.retain(|_, section| !section.is_null());

    serde_json::from_value(serde_json::Value::Object(root)).map_err(|e| ParseError {
        kind: ParseErrorKind::TypeMismatch,
        message: e.to_string(),
        path: None,
    })
}
