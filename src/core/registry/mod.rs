//! Pattern registry: per-extension ordered comment rules.
//!
//! The registry is built once at startup (built-ins plus any external rule
//! sources) and then shared read-only by the walker and every worker. Rule
//! precedence follows registration order.
//!
//! ## Module Structure
//!
//! - `builtin`: the compiled-in language table
//! - `source`: the `RuleSource` capability and its implementations

use std::collections::HashMap;

use regex::Regex;

use crate::core::types::{CommentKind, ScanWarning};

pub mod builtin;
pub mod source;

pub use builtin::language_name;
pub use source::{
    AnyRuleSource, BuiltinRules, JsonRuleFile, RuleDescriptor, RuleMapping, RuleSource,
    RuleSourceError,
};

/// A compiled comment rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub extension: String,
    pub kind: CommentKind,
    /// Single-line pattern, or the opening marker of a multi-line pair.
    pub start: Regex,
    /// Closing marker; `None` for single-line rules.
    pub end: Option<Regex>,
}

impl PatternRule {
    pub fn single(extension: &str, pattern: &str) -> Result<Self, RuleSourceError> {
        let extension = normalize_extension(extension);
        let start = compile(&extension, pattern)?;
        Ok(Self {
            extension,
            kind: CommentKind::Single,
            start,
            end: None,
        })
    }

    pub fn multi(extension: &str, start: &str, end: &str) -> Result<Self, RuleSourceError> {
        let extension = normalize_extension(extension);
        let start = compile(&extension, start)?;
        let end = compile(&extension, end)?;
        Ok(Self {
            extension,
            kind: CommentKind::Multi,
            start,
            end: Some(end),
        })
    }

    fn from_descriptor(
        extension: &str,
        descriptor: &RuleDescriptor,
    ) -> Result<Self, RuleSourceError> {
        match descriptor {
            RuleDescriptor::Single { pattern } => Self::single(extension, pattern),
            RuleDescriptor::Multi { start, end } => Self::multi(extension, start, end),
        }
    }

    /// Pattern text in the same shape as a rule file, for listings.
    pub fn describe(&self) -> String {
        match &self.end {
            Some(end) => format!("{} ... {}", self.start.as_str(), end.as_str()),
            None => self.start.as_str().to_string(),
        }
    }
}

fn compile(extension: &str, pattern: &str) -> Result<Regex, RuleSourceError> {
    if pattern.is_empty() {
        return Err(RuleSourceError::EmptyPattern {
            extension: extension.to_string(),
        });
    }
    let regex = Regex::new(pattern).map_err(|e| RuleSourceError::InvalidPattern {
        extension: extension.to_string(),
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;
    // A matcher that accepts "" would emit zero-width comments everywhere.
    if regex.is_match("") {
        return Err(RuleSourceError::MatchesEmpty {
            extension: extension.to_string(),
            pattern: pattern.to_string(),
        });
    }
    Ok(regex)
}

/// Strip a leading dot and lowercase: `.PY` → `py`.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Ordered comment rules keyed by normalized extension.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    rules: HashMap<String, Vec<PatternRule>>,
}

impl PatternRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in language table.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .load_source(&BuiltinRules)
            .expect("Built-in comment rules should always compile");
        registry
    }

    /// Append rules for an extension after any already registered.
    pub fn register(&mut self, extension: &str, rules: Vec<PatternRule>) {
        let extension = normalize_extension(extension);
        let entry = self.rules.entry(extension.clone()).or_default();
        entry.extend(rules.into_iter().map(|mut rule| {
            rule.extension = extension.clone();
            rule
        }));
    }

    /// Rules for an extension in registration order (empty if unknown).
    pub fn rules_for(&self, extension: &str) -> &[PatternRule] {
        self.rules
            .get(&normalize_extension(extension))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, extension: &str) -> bool {
        !self.rules_for(extension).is_empty()
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .rules
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(ext, _)| ext.as_str())
            .collect();
        extensions.sort_unstable();
        extensions
    }

    /// Validate, compile and register everything a source produces.
    ///
    /// All descriptors are compiled before any is registered: on error the
    /// registry is left exactly as it was. Returns the number of rules added.
    pub fn load_source<S: RuleSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<usize, RuleSourceError> {
        let mapping = source.produce()?;

        let mut compiled = Vec::with_capacity(mapping.len());
        for (extension, descriptors) in &mapping {
            if normalize_extension(extension).is_empty() {
                return Err(RuleSourceError::EmptyExtension);
            }
            let rules = descriptors
                .iter()
                .map(|d| PatternRule::from_descriptor(extension, d))
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push((extension, rules));
        }

        let mut added = 0;
        for (extension, rules) in compiled {
            added += rules.len();
            self.register(extension, rules);
        }
        Ok(added)
    }

    /// Load several sources, turning failures into warnings.
    pub fn load_sources<S: RuleSource>(&mut self, sources: &[S]) -> Vec<ScanWarning> {
        sources
            .iter()
            .filter_map(|source| match self.load_source(source) {
                Ok(_) => None,
                Err(e) => Some(ScanWarning::new(
                    source.name(),
                    format!("rule source skipped: {}", e),
                )),
            })
            .collect()
    }

    /// Tag identifying the active pattern set; changes whenever any rule does.
    pub fn version(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        for extension in self.extensions() {
            hasher.update(b"\0ext\0");
            hasher.update(extension.as_bytes());
            for rule in self.rules_for(extension) {
                hasher.update(b"\0rule\0");
                hasher.update(rule.kind.to_string().as_bytes());
                hasher.update(b"\0");
                hasher.update(rule.start.as_str().as_bytes());
                if let Some(end) = &rule.end {
                    hasher.update(b"\0");
                    hasher.update(end.as_str().as_bytes());
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}
