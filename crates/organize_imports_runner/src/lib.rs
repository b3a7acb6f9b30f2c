//! Import organizing for batches of JavaScript/TypeScript files.
//!
//! Input files are grouped by the tsconfig that owns them (or, without one,
//! by their `.editorconfig` style), each group's files are organized in a
//! shared workspace, and changed files are written back once per group. In
//! list mode nothing is written; the paths of files with unorganized imports
//! are printed instead.
//!
//! # Examples
//!
//! ```no_run
//! use organize_imports_runner::{Config, run_organize};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     list_different: true,
//!     files: vec![std::path::PathBuf::from("tsconfig.json")],
//! };
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! let summary = run_organize(&cfg, &mut stdout)?;
//! stdout.flush()?;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

mod config;
mod detector;
mod group;
mod line_ending;
mod registry;
mod reporter;
mod runner;
mod types;

// Re-export public API
pub use config::{Config, USAGE_ERROR_EXIT_CODE, parse_failure_exit_code};
pub use detector::{ChangeMode, Snapshot, did_change, serialize_imports};
pub use group::{GroupKey, GroupScope, ProcessingGroup};
pub use line_ending::LineEndingVote;
pub use registry::ProjectGroupRegistry;
pub use reporter::{Reporter, print_not_processed};
pub use runner::{NO_FILES_MESSAGE, run_organize};
pub use types::{FileOutcome, NotProcessed, RunSummary};
