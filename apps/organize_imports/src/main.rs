use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use organize_imports_runner::{
    Config, NO_FILES_MESSAGE, USAGE_ERROR_EXIT_CODE, parse_failure_exit_code,
};
use std::io::{BufWriter, Write};
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cfg = match Config::try_parse() {
        Ok(cfg) => cfg,
        Err(e) => {
            let code = parse_failure_exit_code(&e);
            e.print()?;
            std::process::exit(code);
        }
    };
    debug!("Parsed CLI arguments: {:?}", cfg);

    if cfg.files.is_empty() {
        eprintln!("{}", NO_FILES_MESSAGE);
        std::process::exit(USAGE_ERROR_EXIT_CODE);
    }

    let start = Instant::now();
    let summary = organize_imports_runner::run_organize(&cfg, &mut stdout)?;
    stdout.flush()?;

    info!(
        "Finished in {}ms: {} groups, {} files, {} modified",
        start.elapsed().as_millis(),
        summary.groups,
        summary.files_processed,
        summary.modified.len()
    );

    if !summary.not_processed.is_empty() {
        organize_imports_runner::print_not_processed(&mut std::io::stderr(), &summary)?;
    }

    let code = summary.exit_code();
    if code != 0 {
        // Unorganized imports found in list mode
        std::process::exit(code);
    }

    Ok(())
}
