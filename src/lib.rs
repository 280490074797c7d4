//! Lingo - i18n extraction and locale synchronization
//!
//! Lingo is a CLI tool and library that finds hard-coded UI text in
//! JavaScript, TypeScript, JSX and Vue single-file components, turns it into
//! translation keys, and keeps JSON locale files in sync with the keys the
//! code actually references.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, reporting)
//! - `config`: `.lingorc.json` loading and validation
//! - `core`: Scanning, extraction, classification, sync and codemods
//! - `fs_utils`: Atomic file writes
//! - `issues`: Issue types and severities
//! - `locale`: Locale documents and the JSON locale store

pub mod cli;
pub mod config;
pub mod core;
pub mod fs_utils;
pub mod issues;
pub mod locale;
