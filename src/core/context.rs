use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result, bail};

use crate::{
    cli::args::ScanArgs,
    config::{Config, load_config},
    core::{
        cache::CacheStore,
        filter::{BlockFilter, FailMarker},
        pool::{Cancellation, ScanEngine, default_workers},
        registry::{AnyRuleSource, JsonRuleFile, PatternRegistry},
        types::{ScanResult, ScanWarning},
        walker::{WalkOptions, explicit_files, walk},
    },
};

/// Everything one `scan` run needs, resolved before any file is touched.
///
/// # Configuration Priority
///
/// 1. CLI arguments (e.g., `--max-depth unbounded`)
/// 2. `.commentaryrc.json` config file
/// 3. Built-in defaults
///
/// Ignore substrings and glob patterns are additive: CLI values extend the
/// config file's lists. Every other list given on the command line replaces
/// the config file's value.
pub struct ScanContext {
    pub root: PathBuf,
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,
    pub registry: PatternRegistry,
    pub filter: BlockFilter,
    pub fail_marker: FailMarker,
    pub workers: usize,
    pub progress: bool,
    walk_options: WalkOptions,
    /// Explicit inputs replacing the directory walk.
    explicit_inputs: Option<Vec<String>>,
    cache_path: Option<PathBuf>,
    /// Warnings raised while setting up (skipped rule sources).
    warnings: Vec<ScanWarning>,
    cancellation: Cancellation,
}

impl ScanContext {
    pub fn new(args: &ScanArgs) -> Result<Self> {
        let loaded = load_config(&args.root)?;
        let base_dir = loaded.base_dir().map(Path::to_path_buf);
        let config = merge_config(loaded.config, args);
        config.validate()?;

        let root = args.root.clone();
        let mut sources: Vec<AnyRuleSource> = Vec::new();
        for plugin in &config.plugins {
            let path = match &base_dir {
                Some(dir) => dir.join(plugin),
                None => PathBuf::from(plugin),
            };
            sources.push(JsonRuleFile::new(path).into());
        }
        sources.extend(
            args.plugins
                .iter()
                .map(|p| AnyRuleSource::from(JsonRuleFile::new(p))),
        );

        let mut registry = PatternRegistry::with_builtins();
        let warnings = registry.load_sources(&sources);

        let explicit_inputs = collect_explicit_inputs(args)?;
        if explicit_inputs.is_none() && !root.exists() {
            bail!("Scan root does not exist: {}", root.display());
        }

        let cache_path = config.cache.then(|| match &args.cache_path {
            Some(path) => path.clone(),
            None => root.join(&config.cache_path),
        });

        let mut walk_options = WalkOptions::new(
            &config.extensions,
            &config.ignore,
            &config.ignore_patterns,
            config.ignore_regex.as_deref(),
            config.max_depth,
        )?;
        if let Some(path) = &cache_path
            && let Ok(abs) = std::path::absolute(path)
        {
            walk_options.skip.push(abs);
        }

        let filter = BlockFilter::new(
            config.kind,
            &config.extensions,
            &config.contains,
            config.min_lines,
        )?;
        let fail_marker = FailMarker::new(&config.fail_on)?;
        let workers = config.workers.unwrap_or_else(default_workers);

        Ok(Self {
            root,
            config,
            registry,
            filter,
            fail_marker,
            workers,
            progress: args.progress,
            walk_options,
            explicit_inputs,
            cache_path,
            warnings,
            cancellation: Cancellation::new(),
        })
    }

    /// Token that stops the run before its next file task.
    pub fn cancellation(&self) -> Cancellation {
        self.cancellation.clone()
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Find candidate files, extract their blocks, and persist the cache.
    ///
    /// The returned result is unfiltered; apply [`ScanContext::filter`] for reporting.
    pub fn scan(&self) -> Result<ScanResult> {
        let outcome = match &self.explicit_inputs {
            Some(inputs) => explicit_files(inputs, &self.registry, &self.walk_options),
            None => walk(&self.root, &self.registry, &self.walk_options),
        };

        let mut warnings = self.warnings.clone();
        let store = self.cache_path.as_ref().map(|path| {
            let (store, warning) = CacheStore::load_or_empty(path);
            warnings.extend(warning);
            store
        });

        let engine = ScanEngine {
            registry: &self.registry,
            cache: store.as_ref(),
            grouping: self.config.grouping,
            symbols: self.config.symbols,
            workers: self.workers,
            cancellation: self.cancellation.clone(),
            progress: self.progress,
        };
        let mut result = engine.run(&outcome.files)?;

        if let Some(store) = &store
            && let Err(e) = store.flush()
        {
            warnings.push(ScanWarning::new(
                store.path().display().to_string(),
                format!("cache not saved: {}", e),
            ));
        }

        result.errors.extend(outcome.errors);
        result.errors.sort_by(|a, b| a.path.cmp(&b.path));
        result.warnings = warnings;
        Ok(result)
    }
}

fn merge_config(mut config: Config, args: &ScanArgs) -> Config {
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    config.ignore.extend(args.ignore.iter().cloned());
    config
        .ignore_patterns
        .extend(args.ignore_patterns.iter().cloned());
    if args.ignore_regex.is_some() {
        config.ignore_regex = args.ignore_regex.clone();
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if let Some(min_lines) = args.min_lines {
        config.min_lines = min_lines;
    }
    if let Some(kind) = args.only {
        config.kind = kind;
    }
    if !args.contains.is_empty() {
        config.contains = args.contains.clone();
    }
    if !args.fail_on.is_empty() {
        config.fail_on = args.fail_on.clone();
    }
    if args.no_cache {
        config.cache = false;
    }
    if let Some(grouping) = args.grouping {
        config.grouping = grouping;
    }
    if args.symbols {
        config.symbols = true;
    }
    if !args.highlight.is_empty() {
        config.highlight = args.highlight.clone();
    }
    config
}

/// `--files` plus the lines of `--filelist`, or `None` to walk the root.
fn collect_explicit_inputs(args: &ScanArgs) -> Result<Option<Vec<String>>> {
    if args.files.is_empty() && args.filelist.is_none() {
        return Ok(None);
    }
    let mut inputs = args.files.clone();
    if let Some(list) = &args.filelist {
        let content = fs::read_to_string(list)
            .with_context(|| format!("Failed to read file list: {}", list.display()))?;
        inputs.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }
    Ok(Some(inputs))
}
