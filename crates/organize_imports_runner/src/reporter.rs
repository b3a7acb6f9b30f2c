use std::{
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use log::trace;

use crate::types::RunSummary;

/// Console output of a run.
///
/// Progress lines are only written when `show_progress` is set; list-mode
/// paths are always written, uncolored, one per line.
pub struct Reporter<'a, W: Write> {
    writer: &'a mut W,
    show_progress: bool,
}

impl<'a, W: Write> Reporter<'a, W> {
    pub fn new(writer: &'a mut W, show_progress: bool) -> Self {
        Self { writer, show_progress }
    }

    pub fn banner(&mut self) -> io::Result<()> {
        if self.show_progress {
            writeln!(self.writer, "{}", "Organizing imports...".bright_yellow())?;
        }
        Ok(())
    }

    pub fn file_started(&mut self, path: &Path) -> io::Result<()> {
        if self.show_progress {
            write!(self.writer, "{}", path.display().to_string().bright_black())?;
            self.writer.flush()?;
        }
        Ok(())
    }

    pub fn file_unchanged(&mut self) -> io::Result<()> {
        if self.show_progress {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn file_skipped(&mut self) -> io::Result<()> {
        if self.show_progress {
            writeln!(self.writer, " (skipped)")?;
        }
        Ok(())
    }

    /// Rewrites the current line with the uncolored path and a marker.
    pub fn file_modified(&mut self, path: &Path) -> io::Result<()> {
        if self.show_progress {
            writeln!(self.writer, "\r{} (modified)", path.display())?;
        }
        Ok(())
    }

    pub fn list_different(&mut self, path: &Path) -> io::Result<()> {
        trace!("Listing {}", path.display());
        writeln!(self.writer, "{}", path.display())
    }

    pub fn done(&mut self) -> io::Result<()> {
        if self.show_progress {
            writeln!(self.writer, "{}", "Done!".bright_yellow())?;
        }
        self.writer.flush()
    }
}

/// Warns about inputs that could not be processed at all.
pub fn print_not_processed<W: Write>(writer: &mut W, summary: &RunSummary) -> io::Result<()> {
    for item in &summary.not_processed {
        writeln!(
            writer,
            "{} {} was not processed: {}",
            "warning:".yellow().bold(),
            item.path.display(),
            item.reason
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NotProcessed;
    use std::path::PathBuf;

    #[test]
    fn test_quiet_reporter_only_lists_paths() {
        let mut out = Vec::new();
        {
            let mut reporter = Reporter::new(&mut out, false);
            reporter.banner().unwrap();
            reporter.file_started(Path::new("/p/a.ts")).unwrap();
            reporter.file_modified(Path::new("/p/a.ts")).unwrap();
            reporter.list_different(Path::new("/p/a.ts")).unwrap();
            reporter.done().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "/p/a.ts\n");
    }

    #[test]
    fn test_progress_lines() {
        let mut out = Vec::new();
        {
            let mut reporter = Reporter::new(&mut out, true);
            reporter.file_started(Path::new("/p/a.ts")).unwrap();
            reporter.file_skipped().unwrap();
            reporter.file_started(Path::new("/p/b.ts")).unwrap();
            reporter.file_modified(Path::new("/p/b.ts")).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" (skipped)\n"));
        assert!(text.contains("\r/p/b.ts (modified)\n"));
    }

    #[test]
    fn test_not_processed_warning() {
        let summary = RunSummary {
            not_processed: vec![NotProcessed {
                path: PathBuf::from("/p/missing.ts"),
                reason: "Failed to read".to_string(),
            }],
            ..Default::default()
        };
        let mut out = Vec::new();
        print_not_processed(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("/p/missing.ts was not processed: Failed to read"));
    }
}
