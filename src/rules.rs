//! The built-in rule catalog.
//!
//! Every built-in is a [`BuiltinRule`]: a [`RuleKind`] plus its raw parameter
//! tokens, evaluated by one `match`. Except for the `required*` family, rules
//! pass on empty values so that "optional but well-formed" fields need no
//! extra declaration.

use crate::datasource::DataSource;
use crate::enums::RuleKind;
use crate::error::{RuleError, RuleErrorKind};
use crate::rule::{Param, Rule, is_reference, resolve_parameter};
use crate::value::{
    display_value, is_blank, is_empty, is_integer, is_number, loose_eq, to_boolean, to_number,
};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&/=]*)$",
    )
    .unwrap()
});

static ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHA_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";
const DEFAULT_PASSWORD_MIN: &str = "8";
const DEFAULT_PASSWORD_MAX: &str = "32";
const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// A catalog rule with its parameters.
#[derive(Clone, Debug)]
pub struct BuiltinRule {
    kind: RuleKind,
    params: Vec<String>,
    /// `matches` compiles its pattern once, when built.
    pattern: Option<Result<Regex, regex::Error>>,
}

impl PartialEq for BuiltinRule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.params == other.params
    }
}

impl Eq for BuiltinRule {}

impl BuiltinRule {
    /// `password` without parameters gets the default bounds `8,32`.
    pub fn new(kind: RuleKind, params: Vec<String>) -> Self {
        let params = if kind == RuleKind::Password && params.iter().all(|p| p.is_empty()) {
            vec![
                DEFAULT_PASSWORD_MIN.to_string(),
                DEFAULT_PASSWORD_MAX.to_string(),
            ]
        } else {
            params
        };
        let pattern = match kind {
            RuleKind::Matches => params
                .first()
                .filter(|p| !p.is_empty())
                .map(|p| Regex::new(p)),
            _ => None,
        };
        Self {
            kind,
            params,
            pattern,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    fn param(&self, index: usize) -> Option<&str> {
        self.params
            .get(index)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    fn require_param(&self, index: usize, what: &str) -> Result<&str, RuleError> {
        self.param(index).ok_or_else(|| {
            RuleError::missing_parameter(self.kind.as_str(), format!("{} requires {}", self.kind, what))
        })
    }

    fn require_reference(&self) -> Result<&str, RuleError> {
        match self.param(0) {
            Some(token) if is_reference(token) => Ok(token),
            _ => Err(RuleError::invalid_parameter(
                self.kind.as_str(),
                format!(
                    "{} requires a parameter referencing another field path using @",
                    self.kind
                ),
            )),
        }
    }

    fn invalid(&self, message: String) -> RuleError {
        RuleError::invalid_parameter(self.kind.as_str(), message)
    }

    fn parse_count(&self, index: usize, what: &str) -> Result<usize, RuleError> {
        let raw = self.require_param(index, what)?;
        raw.trim()
            .parse()
            .map_err(|_| self.invalid(format!("{} {} must be a non-negative integer", self.kind, what)))
    }
}

#[async_trait(?Send)]
impl Rule for BuiltinRule {
    async fn validate(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        match self.kind {
            RuleKind::Required => Ok(!is_blank(value)),
            RuleKind::RequiredWith => self.required_with(value, path, data, false),
            RuleKind::RequiredWithout => self.required_with(value, path, data, true),
            RuleKind::RequiredWhen => self.required_when(value, path, data),
            RuleKind::RequiredUnless => self.required_unless(value, path, data),
            RuleKind::SameAs => self.same_as(value, path, data),
            RuleKind::Number => Ok(is_empty(value, false, false) || is_number(value)),
            RuleKind::Integer => Ok(is_empty(value, false, false) || is_integer(value)),
            RuleKind::Gt => self.compare_number(value, path, data, |a, b| a > b),
            RuleKind::Gte => self.compare_number(value, path, data, |a, b| a >= b),
            RuleKind::Lt => self.compare_number(value, path, data, |a, b| a < b),
            RuleKind::Lte => self.compare_number(value, path, data, |a, b| a <= b),
            RuleKind::MinLength => self.length(value, |len, n| len >= n, "a minimum length"),
            RuleKind::MaxLength => self.length(value, |len, n| len <= n, "a maximum length"),
            RuleKind::StartsWith => self.substring(value, path, data, |s, sub| s.starts_with(sub)),
            RuleKind::Contains => self.substring(value, path, data, |s, sub| s.contains(sub)),
            RuleKind::Email => Ok(matches_static(value, &EMAIL_RE)),
            RuleKind::Url => Ok(matches_static(value, &URL_RE)),
            RuleKind::Alpha => Ok(matches_static(value, &ALPHA_RE)),
            RuleKind::AlphaNumeric => Ok(matches_static(value, &ALPHA_NUMERIC_RE)),
            RuleKind::Slug => Ok(matches_static(value, &SLUG_RE)),
            RuleKind::Matches => self.matches(value),
            RuleKind::InList => self.in_list(value),
            RuleKind::NotInList => self.in_list(value).map(|found| !found),
            RuleKind::ArrayMin => self.array_length(value, |len, n| len >= n, "minimum length"),
            RuleKind::ArrayMax => self.array_length(value, |len, n| len <= n, "maximum length"),
            RuleKind::Date => Ok(self.date_format(value)),
            RuleKind::DateAfter => self.date_compare(value, path, data, |v, bound| v > bound),
            RuleKind::DateBefore => self.date_compare(value, path, data, |v, bound| v < bound),
            RuleKind::DateBetween => self.date_between(value, path, data),
            RuleKind::Age => self.age(value),
            RuleKind::Password => self.password(value),
        }
    }

    fn parameters(&self) -> &[String] {
        &self.params
    }
}

// ─── Conditional requiredness ───────────────────────────────────────────────

impl BuiltinRule {
    /// `required_with` when `when_empty` is false, `required_without` otherwise.
    fn required_with(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
        when_empty: bool,
    ) -> Result<bool, RuleError> {
        let token = self.require_reference()?;
        let other = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(true),
            resolved => resolved.into_value(),
        };
        if is_blank(other.as_ref()) == when_empty {
            return Ok(!is_blank(value));
        }
        Ok(true)
    }

    fn required_when(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        let token = self.require_reference()?;
        let other = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(true),
            resolved => resolved.into_value(),
        };
        let expected = self
            .param(1)
            .and_then(|t| resolve_parameter(t, path, data).into_value());

        if loose_eq(other.as_ref(), expected.as_ref()) {
            return Ok(!is_blank(value));
        }
        Ok(true)
    }

    fn required_unless(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        let token = self.require_reference()?;
        let other = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(true),
            resolved => resolved.into_value(),
        };
        let expected = self
            .param(1)
            .and_then(|t| resolve_parameter(t, path, data).into_value());

        let expected = to_boolean(expected.as_ref());
        let actual = to_boolean(other.as_ref());
        if loose_eq(Some(&expected), Some(&actual)) {
            return Ok(true);
        }
        Ok(!is_blank(value))
    }

    fn same_as(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let token = self.require_param(0, "a comparison value parameter")?;
        match resolve_parameter(token, path, data) {
            Param::Unresolvable => Ok(true),
            resolved => Ok(loose_eq(value, resolved.into_value().as_ref())),
        }
    }
}

// ─── Numbers and lengths ────────────────────────────────────────────────────

impl BuiltinRule {
    fn compare_number(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
        compare: fn(f64, f64) -> bool,
    ) -> Result<bool, RuleError> {
        if is_empty(value, false, false) {
            return Ok(true);
        }
        let Some(actual) = to_number(value) else {
            return Ok(false);
        };

        let token = self.param(0).ok_or_else(|| {
            RuleError::missing_parameter(self.kind.as_str(), "Validator requires a comparison value")
        })?;
        let bound = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(true),
            resolved => resolved.into_value(),
        };
        let bound = to_number(bound.as_ref())
            .ok_or_else(|| self.invalid("Validator requires a valid number for comparison".to_string()))?;

        Ok(compare(actual, bound))
    }

    fn length(
        &self,
        value: Option<&Value>,
        compare: fn(usize, usize) -> bool,
        what: &str,
    ) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let limit = self.parse_count(0, what)?;
        let len = display_value(value).chars().count();
        Ok(compare(len, limit))
    }

    fn array_length(
        &self,
        value: Option<&Value>,
        compare: fn(usize, usize) -> bool,
        what: &str,
    ) -> Result<bool, RuleError> {
        if is_empty(value, false, false) {
            return Ok(true);
        }
        let Some(items) = value.and_then(Value::as_array) else {
            return Ok(false);
        };
        let limit = self.parse_count(0, what)?;
        Ok(compare(items.len(), limit))
    }
}

// ─── Strings ────────────────────────────────────────────────────────────────

fn matches_static(value: Option<&Value>, re: &Regex) -> bool {
    is_blank(value) || re.is_match(&display_value(value))
}

impl BuiltinRule {
    fn substring(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
        test: fn(&str, &str) -> bool,
    ) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let token = self.require_param(0, "a substring parameter")?;
        let needle = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(true),
            resolved => display_value(resolved.into_value().as_ref()),
        };
        Ok(test(&display_value(value), &needle))
    }

    fn matches(&self, value: Option<&Value>) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        self.require_param(0, "a regular expression pattern parameter")?;
        match &self.pattern {
            Some(Ok(re)) => Ok(re.is_match(&display_value(value))),
            Some(Err(e)) => Err(RuleError {
                kind: RuleErrorKind::InvalidPattern,
                rule: self.kind.as_str().to_string(),
                message: format!("Invalid regular expression pattern: {}", e),
            }),
            None => Ok(true),
        }
    }

    /// Whether the value's text is one of the parameters.
    fn in_list(&self, value: Option<&Value>) -> Result<bool, RuleError> {
        if self.params.is_empty() {
            return Err(RuleError::missing_parameter(
                self.kind.as_str(),
                format!("{} requires at least one allowed value parameter", self.kind),
            ));
        }
        if is_blank(value) {
            // Empty values pass both in_list and not_in_list.
            return Ok(self.kind == RuleKind::InList);
        }
        let text = display_value(value);
        Ok(self.params.iter().any(|p| *p == text))
    }

    fn password(&self, value: Option<&Value>) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let min = self
            .param(0)
            .unwrap_or(DEFAULT_PASSWORD_MIN)
            .trim()
            .parse::<usize>();
        let max = self
            .param(1)
            .unwrap_or(DEFAULT_PASSWORD_MAX)
            .trim()
            .parse::<usize>();
        let (min, max) = match (min, max) {
            (Ok(min), Ok(max)) if min >= 1 && max >= min => (min, max),
            _ => {
                return Err(self.invalid(
                    "password requires valid min_characters and max_characters parameters"
                        .to_string(),
                ));
            }
        };

        let text = display_value(value);
        let len = text.chars().count();
        Ok(len >= min
            && len <= max
            && text.chars().any(|c| c.is_ascii_uppercase())
            && text.chars().any(|c| c.is_ascii_digit())
            && text.chars().any(|c| PASSWORD_SPECIALS.contains(c)))
    }
}

// ─── Dates ──────────────────────────────────────────────────────────────────

/// `(name, strftime pattern)` for the supported explicit formats.
const DATE_FORMATS: [(&str, &str); 6] = [
    ("YYYY-MM-DD", "%Y-%m-%d"),
    ("MM/DD/YYYY", "%m/%d/%Y"),
    ("DD/MM/YYYY", "%d/%m/%Y"),
    ("YYYY/MM/DD", "%Y/%m/%d"),
    ("MM-DD-YYYY", "%m-%d-%Y"),
    ("DD-MM-YYYY", "%d-%m-%Y"),
];

const LOOSE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

const LOOSE_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Reads a date from RFC 3339 text, common date/time layouts, or epoch
/// milliseconds.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in LOOSE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in LOOSE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

impl BuiltinRule {
    fn date_format(&self, value: Option<&Value>) -> bool {
        if is_blank(value) {
            return true;
        }
        let format = self.param(0).unwrap_or(DEFAULT_DATE_FORMAT);
        let text = display_value(value);

        match DATE_FORMATS.iter().find(|(name, _)| *name == format) {
            // Each supported layout is exactly ten characters with padded fields.
            Some((_, pattern)) => {
                text.len() == 10 && NaiveDate::parse_from_str(&text, pattern).is_ok()
            }
            None => value.and_then(parse_date).is_some(),
        }
    }

    /// Resolves a date bound: a literal, a reference, or `now`.
    fn date_bound(
        &self,
        index: usize,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<Option<NaiveDateTime>, RuleError> {
        let token = self.require_param(index, "a date to compare against")?;
        let bound = match resolve_parameter(token, path, data) {
            Param::Unresolvable => return Ok(None),
            resolved => resolved.into_value(),
        };
        if bound.as_ref().and_then(Value::as_str) == Some("now") {
            return Ok(Some(Utc::now().naive_utc()));
        }
        bound
            .as_ref()
            .and_then(parse_date)
            .map(Some)
            .ok_or_else(|| self.invalid(format!("{} comparison value is not a valid date", self.kind)))
    }

    fn date_compare(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
        compare: fn(NaiveDateTime, NaiveDateTime) -> bool,
    ) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let Some(date) = value.and_then(parse_date) else {
            return Ok(false);
        };
        match self.date_bound(0, path, data)? {
            Some(bound) => Ok(compare(date, bound)),
            None => Ok(true),
        }
    }

    fn date_between(
        &self,
        value: Option<&Value>,
        path: &str,
        data: &dyn DataSource,
    ) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let Some(date) = value.and_then(parse_date) else {
            return Ok(false);
        };
        let min = self.date_bound(0, path, data)?;
        let max = self.date_bound(1, path, data)?;
        Ok(min.is_none_or(|min| date >= min) && max.is_none_or(|max| date <= max))
    }

    fn age(&self, value: Option<&Value>) -> Result<bool, RuleError> {
        if is_blank(value) {
            return Ok(true);
        }
        let Some(birth) = value.and_then(parse_date).map(|dt| dt.date()) else {
            return Ok(false);
        };
        let min_age = self.parse_count(0, "minimum age")?;

        let today = Utc::now().date_naive();
        let mut age = i64::from(today.year()) - i64::from(birth.year());
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Ok(age >= min_age as i64)
    }
}
