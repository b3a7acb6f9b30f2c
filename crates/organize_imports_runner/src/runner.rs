use anyhow::{Result, bail};
use log::{debug, info, trace, warn};
use organize_imports_core::{FileId, IGNORE_MARKER, Workspace};
use std::io::Write;

use crate::{
    config::Config,
    detector::{ChangeMode, Snapshot, did_change},
    group::ProcessingGroup,
    registry::ProjectGroupRegistry,
    reporter::Reporter,
    types::{FileOutcome, NotProcessed, RunSummary},
};

pub const NO_FILES_MESSAGE: &str = "No files specified.";

/// Organizes the imports of every file in `cfg`, writing progress (or, in
/// list mode, the paths of files with unorganized imports) to `out`.
///
/// A file that cannot be grouped is reported in the summary and skipped. A
/// file that cannot be organized aborts the run; groups finalized before it
/// keep their writes.
pub fn run_organize<W: Write>(cfg: &Config, out: &mut W) -> Result<RunSummary> {
    if cfg.files.is_empty() {
        bail!(NO_FILES_MESSAGE);
    }

    let mode = if cfg.list_different { ChangeMode::ImportsOnly } else { ChangeMode::FullText };
    info!("Organizing {} inputs in {:?} mode", cfg.files.len(), mode);

    let mut reporter = Reporter::new(out, !cfg.list_different);
    reporter.banner()?;

    let mut summary = RunSummary::default();
    let mut registry = ProjectGroupRegistry::new();
    for path in &cfg.files {
        match registry.assign(path) {
            Ok(key) => trace!("{} -> {:?}", path.display(), key),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                summary
                    .not_processed
                    .push(NotProcessed { path: path.clone(), reason: format!("{:#}", e) });
            }
        }
    }

    let groups = registry.into_groups();
    summary.groups = groups.len();
    info!("Formed {} processing groups", groups.len());

    for mut group in groups {
        process_group(&mut group, mode, &mut reporter, &mut summary)?;
        finalize_group(&mut group, mode, &mut reporter, &mut summary)?;
    }

    reporter.done()?;
    info!(
        "Processed {} files, {} modified, {} skipped",
        summary.files_processed,
        summary.modified.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn process_group<W: Write>(
    group: &mut ProcessingGroup,
    mode: ChangeMode,
    reporter: &mut Reporter<'_, W>,
    summary: &mut RunSummary,
) -> Result<()> {
    let ids = group.resolve_files()?;
    debug!("Group {:?}: {} files", group.key(), ids.len());
    let auto_detect = group.auto_detect_line_ending();

    for id in ids {
        let path = group.workspace.file_path(id).to_path_buf();
        reporter.file_started(&path)?;

        let outcome = organize_file(group, id, auto_detect, mode)?;
        summary.files_processed += 1;

        match outcome {
            FileOutcome::SkippedByIgnoreMarker => {
                reporter.file_skipped()?;
                summary.skipped.push(path);
            }
            FileOutcome::Unchanged => reporter.file_unchanged()?,
            FileOutcome::Changed => {
                reporter.file_modified(&path)?;
                group.modified_files.push(path);
            }
        }
    }
    Ok(())
}

fn organize_file(
    group: &mut ProcessingGroup,
    id: FileId,
    auto_detect: bool,
    mode: ChangeMode,
) -> Result<FileOutcome> {
    let workspace = &mut group.workspace;
    let text = workspace.full_text(id);
    if text.contains(IGNORE_MARKER) {
        trace!("{} carries the ignore marker", workspace.file_path(id).display());
        return Ok(FileOutcome::SkippedByIgnoreMarker);
    }
    if auto_detect {
        group.line_endings.record(text);
    }

    let before = Snapshot::capture(&*workspace, id, mode)?;
    workspace.organize_imports(id)?;
    let after = Snapshot::capture(&*workspace, id, mode)?;

    Ok(if did_change(&before, &after) { FileOutcome::Changed } else { FileOutcome::Unchanged })
}

fn finalize_group<W: Write>(
    group: &mut ProcessingGroup,
    mode: ChangeMode,
    reporter: &mut Reporter<'_, W>,
    summary: &mut RunSummary,
) -> Result<()> {
    if group.modified_files.is_empty() {
        trace!("Group {:?} has no changes", group.key());
        return Ok(());
    }

    match mode {
        ChangeMode::ImportsOnly => {
            for path in &group.modified_files {
                reporter.list_different(path)?;
            }
            summary.differences_found = true;
        }
        ChangeMode::FullText => {
            if let Some(kind) = group.line_endings.decision() {
                debug!("Line ending vote {} -> {:?}", group.line_endings.weight(), kind);
                group.workspace.set_new_line_kind(kind)?;
            }
            let written = group.workspace.save()?;
            debug!("Group {:?}: wrote {} files", group.key(), written);
        }
    }
    summary.modified.extend(group.modified_files.iter().cloned());
    Ok(())
}
