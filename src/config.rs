use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{
    filter::{KindFilter, compile_patterns},
    grouper::GroupingPolicy,
    walker::Depth,
};

pub const CONFIG_FILE_NAME: &str = ".commentaryrc.json";

pub const DEFAULT_CACHE_FILE: &str = ".commentary-cache.json";

pub const DEFAULT_HIGHLIGHT_WORDS: &[&str] = &["TODO", "FIXME", "BUG", "HACK", "NOTE", "WARNING"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extension allow-list; empty scans every registered extension.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Case-insensitive substrings excluding any path that contains them.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_regex: Option<String>,
    #[serde(default)]
    pub max_depth: Depth,
    /// Worker threads; unset means twice the CPU count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(default)]
    pub min_lines: usize,
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub fail_on: Vec<String>,
    /// JSON rule files, relative to the config file's directory.
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default = "default_cache")]
    pub cache: bool,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    #[serde(default)]
    pub grouping: GroupingPolicy,
    #[serde(default)]
    pub symbols: bool,
    #[serde(default = "default_highlight")]
    pub highlight: Vec<String>,
}

fn default_ignore_patterns() -> Vec<String> {
    ["**/.git", "**/node_modules", "**/target", "**/__pycache__"]
        .map(String::from)
        .to_vec()
}

fn default_cache() -> bool {
    true
}

fn default_cache_path() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

fn default_highlight() -> Vec<String> {
    DEFAULT_HIGHLIGHT_WORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            ignore: Vec::new(),
            ignore_patterns: default_ignore_patterns(),
            ignore_regex: None,
            max_depth: Depth::default(),
            workers: None,
            min_lines: 0,
            kind: KindFilter::default(),
            contains: Vec::new(),
            fail_on: Vec::new(),
            plugins: Vec::new(),
            cache: default_cache(),
            cache_path: default_cache_path(),
            grouping: GroupingPolicy::default(),
            symbols: false,
            highlight: default_highlight(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error naming the field if any pattern fails to compile or
    /// the worker count is zero.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignore_patterns {
            Pattern::new(pattern).with_context(|| {
                format!("Invalid glob pattern in 'ignorePatterns': \"{}\"", pattern)
            })?;
        }

        if let Some(regex) = &self.ignore_regex {
            Regex::new(regex)
                .with_context(|| format!("Invalid regex in 'ignoreRegex': \"{}\"", regex))?;
        }

        compile_patterns(&self.contains).context("Invalid pattern in 'contains'")?;
        compile_patterns(&self.fail_on).context("Invalid pattern in 'failOn'")?;

        if self.workers == Some(0) {
            bail!("Invalid value in 'workers': must be at least 1");
        }

        if self.cache && self.cache_path.trim().is_empty() {
            bail!("Invalid value in 'cachePath': must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Where the config came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }

    /// Directory relative config paths are resolved against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
