//! Path-addressed validation rules for nested, incrementally edited data.
//!
//! Rules are declared per path (`"email"`) or per pattern (`"skills.*.name"`)
//! as pipe-delimited strings. A [`Validator`] parses them into rule chains,
//! expands patterns against the data it is given, and keeps one error message
//! per failing concrete path:
//!
//! ```text
//! rule specs → set_rules → chains + dependency graph
//! DataSource → validate / validate_path / validate_pattern → error map
//! ```
//!
//! Data is read through the [`DataSource`] trait. [`PlainDataSource`] wraps a
//! `serde_json::Value`; [`TentativeOverlay`] layers uncommitted edits on top
//! of another source.
//!
//! # Quick Start
//!
//! ```rust
//! use fieldrules::{PlainDataSource, ValidatorFactory};
//! use serde_json::json;
//!
//! let factory = ValidatorFactory::new();
//! let (mut validator, warnings) = factory.make(
//!     [("skills.*.name", "required|min_length:2")],
//!     Default::default(),
//! );
//! assert!(warnings.is_empty());
//!
//! let data = PlainDataSource::new(json!({"skills": [{"name": "JS"}, {}]}));
//! let valid = futures::executor::block_on(validator.validate(&data));
//!
//! assert!(!valid);
//! assert_eq!(
//!     validator.get_errors_for_path("skills.1.name"),
//!     vec!["This field is required"]
//! );
//! ```
//!
//! Rules and message overrides can also be loaded from YAML with [`load`].

pub mod datasource;
pub mod enums;
pub mod error;
pub mod graph;
pub mod message;
pub mod overlay;
pub mod parse;
pub mod path;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod validate;
pub mod value;

pub use datasource::{DataSource, PlainDataSource};
pub use enums::RuleKind;
pub use error::*;
pub use graph::DependencyGraph;
pub use message::{DefaultMessageFormatter, MessageContext, MessageFormatter};
pub use overlay::TentativeOverlay;
pub use parse::{RuleSpec, ValidatorConfig, parse_config};
pub use registry::{RuleFactory, RuleRegistry};
pub use rule::{FnRule, NamedRule, Param, Rule, RuleChain, resolve_parameter};
pub use rules::BuiltinRule;
pub use validate::{Validator, ValidatorFactory, ValidatorOptions};

/// Result of the [`load`] convenience entry point.
#[derive(Debug)]
pub struct LoadResult {
    /// A validator with the document's rules and messages applied.
    pub validator: Validator,
    /// Rule entries that were skipped.
    pub warnings: Vec<Diagnostic>,
}

/// Convenience entry point composing parse → factory → validator.
///
/// # Errors
///
/// Returns a [`ParseError`] if the document cannot be read. Unknown rule
/// names are not errors; they are reported in [`LoadResult::warnings`].
///
/// # Example
///
/// ```rust
/// let yaml = r#"
/// rules:
///   email: required|email
///   password_confirmation: same_as:@password
/// messages:
///   email:required: Tell us where to reach you
/// "#;
///
/// let result = fieldrules::load(yaml).expect("valid document");
/// assert_eq!(
///     result.validator.get_dependent_fields("password"),
///     vec!["password_confirmation"]
/// );
/// ```
pub fn load(input: &str) -> Result<LoadResult, ParseError> {
    let config = parse::parse_config(input)?;
    let (validator, warnings) = ValidatorFactory::new().make(config.rules, config.messages);
    Ok(LoadResult {
        validator,
        warnings,
    })
}
