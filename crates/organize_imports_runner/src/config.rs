use clap::{Parser, error::ErrorKind};
use std::path::PathBuf;

/// Exit status of a run that could not start: no files, or bad arguments.
pub const USAGE_ERROR_EXIT_CODE: i32 = 1;

const AFTER_HELP: &str = "\
Files can be specific ts and js files or tsconfig.json, in which case the whole project is processed.

Files containing the substring \"// organize-imports-ignore\" are skipped.

The --list-different flag prints a list of files with unorganized imports. No files are modified.";

#[derive(Debug, Clone, Parser)]
#[command(name = "organize-imports")]
#[command(about = "Organize import declarations in JavaScript/TypeScript files")]
#[command(after_help = AFTER_HELP)]
pub struct Config {
    /// Print files with unorganized imports instead of rewriting them
    #[arg(long)]
    pub list_different: bool,

    /// Source files, or tsconfig.json files to process whole projects
    pub files: Vec<PathBuf>,
}

/// Status to exit with when argument parsing fails. Help and version output
/// are successes; every other parse error is a usage error, keeping status 2
/// free for "differences found".
pub fn parse_failure_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => USAGE_ERROR_EXIT_CODE,
    }
}
