//! Rule sources: anything that can produce a mapping of extension to comment
//! rule descriptors.
//!
//! The built-in table and JSON rule files both implement [`RuleSource`].
//! A source only *produces* descriptors; validation and compilation happen in
//! [`PatternRegistry::load_source`](super::PatternRegistry::load_source) so a
//! bad source never touches the registry.

use std::{collections::BTreeMap, fs, path::PathBuf};

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::builtin::builtin_mapping;

/// One comment rule as written in a rule file.
///
/// ```json
/// { "type": "single", "pattern": "--.*" }
/// { "type": "multi", "start": "\\{-", "end": "-\\}" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleDescriptor {
    Single { pattern: String },
    Multi { start: String, end: String },
}

/// Extension → ordered rule descriptors.
pub type RuleMapping = BTreeMap<String, Vec<RuleDescriptor>>;

#[derive(Debug, Error)]
pub enum RuleSourceError {
    #[error("cannot read rule source: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("malformed rule mapping: {0}")]
    Malformed(String),

    #[error("empty extension in rule mapping")]
    EmptyExtension,

    #[error("empty pattern for extension '{extension}'")]
    EmptyPattern { extension: String },

    #[error("pattern '{pattern}' for extension '{extension}' matches the empty string")]
    MatchesEmpty { extension: String, pattern: String },

    #[error("invalid pattern '{pattern}' for extension '{extension}': {detail}")]
    InvalidPattern {
        extension: String,
        pattern: String,
        detail: String,
    },
}

/// A provider of comment rules.
#[enum_dispatch]
pub trait RuleSource {
    /// Name used in warnings (file path, "builtin", ...).
    fn name(&self) -> String;

    /// Produce the raw rule mapping. May fail; failures are recoverable.
    fn produce(&self) -> Result<RuleMapping, RuleSourceError>;
}

/// The rule table compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRules;

impl RuleSource for BuiltinRules {
    fn name(&self) -> String {
        "builtin".to_string()
    }

    fn produce(&self) -> Result<RuleMapping, RuleSourceError> {
        Ok(builtin_mapping())
    }
}

/// A JSON file whose top level maps extensions to rule descriptor lists.
#[derive(Debug, Clone)]
pub struct JsonRuleFile {
    path: PathBuf,
}

impl JsonRuleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for JsonRuleFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn produce(&self) -> Result<RuleMapping, RuleSourceError> {
        let content = fs::read_to_string(&self.path)?;
        parse_rule_mapping(&content)
    }
}

/// Every rule source the CLI knows how to load.
#[enum_dispatch(RuleSource)]
#[derive(Debug, Clone)]
pub enum AnyRuleSource {
    Builtin(BuiltinRules),
    JsonFile(JsonRuleFile),
}

/// Parse and shape-check a JSON rule mapping.
pub fn parse_rule_mapping(content: &str) -> Result<RuleMapping, RuleSourceError> {
    serde_json::from_str(content).map_err(|e| RuleSourceError::Malformed(e.to_string()))
}
