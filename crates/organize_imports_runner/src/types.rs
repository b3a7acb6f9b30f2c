use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Changed,
    SkippedByIgnoreMarker,
}

/// An input path that could not be grouped, e.g. because it does not exist.
#[derive(Debug, Clone)]
pub struct NotProcessed {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub groups: usize,
    pub files_processed: usize,
    pub modified: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub not_processed: Vec<NotProcessed>,
    /// Set only in list mode
    pub differences_found: bool,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.differences_found { 2 } else { 0 }
    }
}
