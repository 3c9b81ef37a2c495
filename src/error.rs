use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A non-fatal problem found while reading a rule specification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn warning(code: &str, path: &str, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.to_string(),
            path: Some(path.to_string()),
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} at {}: {}", self.code, path, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Error kind for rule evaluation failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleErrorKind {
    /// A parameter the rule needs was not given.
    MissingParameter,
    /// A parameter (or the value it references) has the wrong shape.
    InvalidParameter,
    /// A regular-expression parameter does not compile.
    InvalidPattern,
    /// Raised by a caller-supplied predicate.
    Predicate,
}

/// Raised by a rule whose own configuration is unusable, or by a
/// caller-supplied predicate that could not decide.
///
/// The validator turns it into the error message for the path being checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleError {
    pub kind: RuleErrorKind,
    pub rule: String,
    pub message: String,
}

impl RuleError {
    pub fn missing_parameter(rule: &str, message: impl Into<String>) -> Self {
        Self {
            kind: RuleErrorKind::MissingParameter,
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    pub fn predicate(rule: &str, message: impl Into<String>) -> Self {
        Self {
            kind: RuleErrorKind::Predicate,
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(rule: &str, message: impl Into<String>) -> Self {
        Self {
            kind: RuleErrorKind::InvalidParameter,
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RuleError {}

/// Error kind for configuration loading failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
}

/// Produced by [`parse_config`](crate::parse::parse_config) when a
/// configuration document cannot be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
