//! Commentary - comment extraction for source trees
//!
//! Commentary walks a directory tree, finds comments in source files using
//! per-extension regex rules, groups adjacent single-line comments into
//! blocks and reports them. Results are cached per file so unchanged files
//! are not re-tokenized.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands and reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (rules, tokenizer, grouping, cache, worker pool)
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
