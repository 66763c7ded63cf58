//! Per-file extraction on a bounded worker pool.
//!
//! Every [`FileTask`] is independent: read, fingerprint, serve from cache or
//! tokenize and group, write back. Completion order is unconstrained; the
//! aggregated result is sorted afterwards so output never depends on it.

use std::{
    fs,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use anyhow::{Context as _, Result, bail};
use rayon::prelude::*;

use crate::core::{
    cache::{CacheEntry, CacheStore, Fingerprint},
    grouper::{GroupingPolicy, group},
    registry::PatternRegistry,
    symbol,
    tokenizer::tokenize,
    types::{CommentBlock, FileError, FileErrorReason, ScanResult},
    walker::FileTask,
};

/// Default pool size: twice the number of logical CPUs.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_mul(2).max(1)
}

/// Cooperative cancellation, checked before each file task starts.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the workers share for one run.
pub struct ScanEngine<'a> {
    pub registry: &'a PatternRegistry,
    pub cache: Option<&'a CacheStore>,
    pub grouping: GroupingPolicy,
    pub symbols: bool,
    pub workers: usize,
    pub cancellation: Cancellation,
    /// Print `[done/total] path` to stderr as each file finishes.
    pub progress: bool,
}

enum TaskOutcome {
    Blocks {
        blocks: Vec<CommentBlock>,
        from_cache: bool,
    },
    Failed(FileError),
    Cancelled,
}

impl<'a> ScanEngine<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self {
            registry,
            cache: None,
            grouping: GroupingPolicy::default(),
            symbols: false,
            workers: default_workers(),
            cancellation: Cancellation::new(),
            progress: false,
        }
    }

    /// Version tag stored in every fingerprint: the rule set plus every
    /// setting that changes what blocks a file produces.
    pub fn pattern_set_version(&self) -> String {
        format!(
            "{}/{}/{}",
            self.registry.version(),
            self.grouping,
            if self.symbols { "symbols" } else { "plain" }
        )
    }

    /// Scan all tasks on a pool of `workers` threads.
    pub fn run(&self, tasks: &[FileTask]) -> Result<ScanResult> {
        if self.workers == 0 {
            bail!("Worker count must be at least 1");
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .context("Failed to start worker pool")?;

        let version = self.pattern_set_version();
        let total = tasks.len();
        let done = AtomicUsize::new(0);
        let outcomes: Vec<TaskOutcome> = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    if self.cancellation.is_cancelled() {
                        return TaskOutcome::Cancelled;
                    }
                    let outcome = self.scan_file(task, &version);
                    if self.progress {
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        eprintln!("[{}/{}] {}", n, total, task.display);
                    }
                    outcome
                })
                .collect()
        });

        let mut result = ScanResult::default();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Blocks { blocks, from_cache } => {
                    result.stats.files_scanned += 1;
                    if from_cache {
                        result.stats.cache_hits += 1;
                    } else {
                        result.stats.tokenized += 1;
                    }
                    result.blocks.extend(blocks);
                }
                TaskOutcome::Failed(error) => {
                    result.stats.files_scanned += 1;
                    result.errors.push(error);
                }
                TaskOutcome::Cancelled => result.stats.cancelled += 1,
            }
        }

        result
            .blocks
            .sort_by(|a, b| (&a.file_path, a.start_line).cmp(&(&b.file_path, b.start_line)));
        result.errors.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    fn scan_file(&self, task: &FileTask, version: &str) -> TaskOutcome {
        let failed = |reason| {
            TaskOutcome::Failed(FileError {
                path: task.display.clone(),
                reason,
            })
        };

        let metadata = fs::metadata(&task.path).ok();
        let bytes = match fs::read(&task.path) {
            Ok(bytes) => bytes,
            Err(e) => return failed(FileErrorReason::Unreadable(e.to_string())),
        };
        let fingerprint = Fingerprint::compute(&bytes, metadata.as_ref(), version);
        let key = std::path::absolute(&task.path)
            .unwrap_or_else(|_| task.path.clone())
            .display()
            .to_string();

        if let Some(cache) = self.cache
            && let Some(mut blocks) = cache.get(&key, &fingerprint)
        {
            for block in &mut blocks {
                block.file_path.clone_from(&task.display);
            }
            return TaskOutcome::Blocks {
                blocks,
                from_cache: true,
            };
        }

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return failed(FileErrorReason::Undecodable),
        };
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let occurrences = tokenize(text, self.registry.rules_for(&task.extension));
        let mut blocks = group(&task.display, occurrences, self.grouping);
        if self.symbols {
            symbol::annotate(&mut blocks, text);
        }

        if let Some(cache) = self.cache {
            cache.put(
                key,
                CacheEntry {
                    file_path: task.display.clone(),
                    fingerprint,
                    blocks: blocks.clone(),
                },
            );
        }

        TaskOutcome::Blocks {
            blocks,
            from_cache: false,
        }
    }
}
