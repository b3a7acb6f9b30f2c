//! Core building blocks for organizing imports in JavaScript/TypeScript files.
//!
//! This crate provides:
//! - Locating the tsconfig that owns a file and the files a tsconfig selects
//! - Resolving per-file style from `.editorconfig`
//! - Parsing import declarations and putting them in canonical order
//! - The [`Workspace`] abstraction over a set of loaded files, with [`Project`]
//!   as its filesystem-backed implementation

mod config;
mod constants;
mod editorconfig;
mod organizer;
mod parser;
mod types;
mod workspace;

// Re-export public API
pub use config::{TsConfig, find_tsconfig, is_tsconfig_file_name, locate_config_scope, normalize_path};
pub use constants::{IGNORE_MARKER, JS_EXTENSIONS, TS_EXTENSIONS, TSCONFIG_FILE_NAME};
pub use editorconfig::resolve_style;
pub use organizer::organize_imports;
pub use parser::import_declarations;
pub use types::{
    FileId, IndentUnit, LoadOutcome, ManipulationSettings, NewLineKind, QuoteStyle,
    StylePreferences,
};
pub use workspace::{Project, Workspace};
