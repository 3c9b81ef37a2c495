//! The closed set of built-in rule kinds.
//!
//! Rules are looked up by name at runtime through the
//! [`RuleRegistry`](crate::registry::RuleRegistry), so callers can add their
//! own; the kinds below are the ones every registry starts with.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A built-in rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    RequiredWith,
    RequiredWithout,
    RequiredWhen,
    RequiredUnless,
    SameAs,
    Number,
    Integer,
    Gt,
    Gte,
    Lt,
    Lte,
    MinLength,
    MaxLength,
    StartsWith,
    Contains,
    Email,
    Url,
    Matches,
    Alpha,
    AlphaNumeric,
    Slug,
    InList,
    NotInList,
    ArrayMin,
    ArrayMax,
    Date,
    DateAfter,
    DateBefore,
    DateBetween,
    Age,
    Password,
}

impl RuleKind {
    pub const ALL: [RuleKind; 32] = [
        RuleKind::Required,
        RuleKind::RequiredWith,
        RuleKind::RequiredWithout,
        RuleKind::RequiredWhen,
        RuleKind::RequiredUnless,
        RuleKind::SameAs,
        RuleKind::Number,
        RuleKind::Integer,
        RuleKind::Gt,
        RuleKind::Gte,
        RuleKind::Lt,
        RuleKind::Lte,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::StartsWith,
        RuleKind::Contains,
        RuleKind::Email,
        RuleKind::Url,
        RuleKind::Matches,
        RuleKind::Alpha,
        RuleKind::AlphaNumeric,
        RuleKind::Slug,
        RuleKind::InList,
        RuleKind::NotInList,
        RuleKind::ArrayMin,
        RuleKind::ArrayMax,
        RuleKind::Date,
        RuleKind::DateAfter,
        RuleKind::DateBefore,
        RuleKind::DateBetween,
        RuleKind::Age,
        RuleKind::Password,
    ];

    /// Name used in rule strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::RequiredWith => "required_with",
            RuleKind::RequiredWithout => "required_without",
            RuleKind::RequiredWhen => "required_when",
            RuleKind::RequiredUnless => "required_unless",
            RuleKind::SameAs => "same_as",
            RuleKind::Number => "number",
            RuleKind::Integer => "integer",
            RuleKind::Gt => "gt",
            RuleKind::Gte => "gte",
            RuleKind::Lt => "lt",
            RuleKind::Lte => "lte",
            RuleKind::MinLength => "min_length",
            RuleKind::MaxLength => "max_length",
            RuleKind::StartsWith => "starts_with",
            RuleKind::Contains => "contains",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Matches => "matches",
            RuleKind::Alpha => "alpha",
            RuleKind::AlphaNumeric => "alpha_numeric",
            RuleKind::Slug => "slug",
            RuleKind::InList => "in_list",
            RuleKind::NotInList => "not_in_list",
            RuleKind::ArrayMin => "array_min",
            RuleKind::ArrayMax => "array_max",
            RuleKind::Date => "date",
            RuleKind::DateAfter => "date_after",
            RuleKind::DateBefore => "date_before",
            RuleKind::DateBetween => "date_between",
            RuleKind::Age => "age",
            RuleKind::Password => "password",
        }
    }

    pub fn from_name(name: &str) -> Option<RuleKind> {
        RuleKind::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Message template used when no custom message applies.
    pub fn default_message(&self) -> &'static str {
        match self {
            RuleKind::Required
            | RuleKind::RequiredWith
            | RuleKind::RequiredWithout
            | RuleKind::RequiredWhen
            | RuleKind::RequiredUnless => "This field is required",
            RuleKind::SameAs => "This field must be the same as {param:0}",
            RuleKind::Number => "This field must be a number",
            RuleKind::Integer => "This field must be an integer",
            RuleKind::Gt => "This field must be greater than {param:0}",
            RuleKind::Gte => "This field must be greater than or equal to {param:0}",
            RuleKind::Lt => "This field must be less than {param:0}",
            RuleKind::Lte => "This field must be less than or equal to {param:0}",
            RuleKind::MinLength => "This field must have at least {param:0} characters",
            RuleKind::MaxLength => "This field must not have more than {param:0} characters",
            RuleKind::StartsWith => "This field must start with \"{param:0}\"",
            RuleKind::Contains => "This field must contain \"{param:0}\"",
            RuleKind::Email => "This field must be a valid email address",
            RuleKind::Url => "This field must be a valid URL",
            RuleKind::Matches => "This field format is invalid",
            RuleKind::Alpha => "This field may only contain letters",
            RuleKind::AlphaNumeric => "This field may only contain letters and numbers",
            RuleKind::Slug => {
                "This field may only contain letters, numbers, dashes and underscores"
            }
            RuleKind::InList => "This field has not an accepted value",
            RuleKind::NotInList => "This field has a value that is not allowed",
            RuleKind::ArrayMin => "This section must have at least {param:0} items",
            RuleKind::ArrayMax => "This section must have at most {param:0} items",
            RuleKind::Date => "This field must be a valid date in the format {param:0}",
            RuleKind::DateAfter => "This field must be a date after {param:0}",
            RuleKind::DateBefore => "This field must be a date before {param:0}",
            RuleKind::DateBetween => "This field must be a date between {param:0} and {param:1}",
            RuleKind::Age => "This field must represent a person of at least {param:0} years of age",
            RuleKind::Password => {
                "This must be between {param:0} and {param:1} characters and include uppercase, number, and special characters"
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
