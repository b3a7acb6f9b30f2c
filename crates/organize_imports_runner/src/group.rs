use anyhow::Result;
use log::{trace, warn};
use organize_imports_core::{FileId, LoadOutcome, Project, StylePreferences, Workspace};
use std::path::{Path, PathBuf};

use crate::line_ending::LineEndingVote;

/// Identity of a processing group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Files owned by this tsconfig
    Scope(PathBuf),
    /// Files with no usable tsconfig, grouped by resolved style
    AdHoc(StylePreferences),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupScope {
    SelectedFiles(Vec<PathBuf>),
    /// A tsconfig was passed directly: everything its project knows about
    AllFiles,
}

/// A workspace plus the files to organize in it and what was observed doing so.
#[derive(Debug)]
pub struct ProcessingGroup {
    key: GroupKey,
    pub(crate) workspace: Project,
    scope: GroupScope,
    auto_detect_line_ending: bool,
    pub(crate) line_endings: LineEndingVote,
    pub(crate) modified_files: Vec<PathBuf>,
}

impl ProcessingGroup {
    pub fn new(
        key: GroupKey,
        workspace: Project,
        scope: GroupScope,
        auto_detect_line_ending: bool,
    ) -> Self {
        Self {
            key,
            workspace,
            scope,
            auto_detect_line_ending,
            line_endings: LineEndingVote::default(),
            modified_files: Vec::new(),
        }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn scope(&self) -> &GroupScope {
        &self.scope
    }

    pub fn workspace(&self) -> &Project {
        &self.workspace
    }

    pub fn auto_detect_line_ending(&self) -> bool {
        self.auto_detect_line_ending
    }

    pub fn modified_files(&self) -> &[PathBuf] {
        &self.modified_files
    }

    pub fn processes_all_files(&self) -> bool {
        self.scope == GroupScope::AllFiles
    }

    /// Records `path` as a member; files are already covered once the group
    /// processes all files, and a path is recorded at most once.
    pub(crate) fn add_member(&mut self, path: &Path) {
        if let GroupScope::SelectedFiles(members) = &mut self.scope
            && !members.iter().any(|m| m == path)
        {
            members.push(path.to_path_buf());
        }
    }

    pub(crate) fn process_all_files(&mut self) {
        if self.scope != GroupScope::AllFiles {
            trace!("Group {:?} now processes all files", self.key);
            self.scope = GroupScope::AllFiles;
        }
    }

    /// Files to organize, in insertion order (or workspace order for all files).
    pub(crate) fn resolve_files(&mut self) -> Result<Vec<FileId>> {
        match &self.scope {
            GroupScope::AllFiles => self.workspace.source_files(),
            GroupScope::SelectedFiles(members) => {
                let mut ids = Vec::with_capacity(members.len());
                for path in members {
                    match self.workspace.get_source_file(path)? {
                        LoadOutcome::Loaded(id) => ids.push(id),
                        LoadOutcome::NotFound => {
                            warn!("{} is no longer part of its workspace", path.display())
                        }
                    }
                }
                Ok(ids)
            }
        }
    }
}
