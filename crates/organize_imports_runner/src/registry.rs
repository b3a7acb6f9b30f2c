use anyhow::{Result, bail};
use log::{debug, info, trace, warn};
use organize_imports_core::{
    LoadOutcome, Project, Workspace, is_tsconfig_file_name, locate_config_scope, normalize_path,
    resolve_style,
};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use crate::group::{GroupKey, GroupScope, ProcessingGroup};

enum Routing {
    Routed(GroupKey),
    NotFound,
}

/// Assigns input files to processing groups, creating groups lazily.
///
/// Files owned by the same tsconfig share one group. Files without one, or
/// that their tsconfig's project does not contain, share a group with every
/// other such file that resolved to the same style.
#[derive(Debug, Default)]
pub struct ProjectGroupRegistry {
    groups: Vec<ProcessingGroup>,
    index: HashMap<GroupKey, usize>,
    failed_scopes: HashSet<PathBuf>,
}

impl ProjectGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `file_path` to its group. An error concerns this file only.
    pub fn assign(&mut self, file_path: &Path) -> Result<GroupKey> {
        let path = normalize_path(file_path);
        trace!("Assigning {}", path.display());

        let routing = match locate_config_scope(&path) {
            Some(scope) if self.failed_scopes.contains(&scope) => {
                trace!("Scope {} failed to load earlier", scope.display());
                Routing::NotFound
            }
            Some(scope) => self.route_to_scope(scope, &path)?,
            None => Routing::NotFound,
        };

        match routing {
            Routing::Routed(key) => Ok(key),
            Routing::NotFound => self.route_ad_hoc(&path),
        }
    }

    pub fn groups(&self) -> &[ProcessingGroup] {
        &self.groups
    }

    pub fn group(&self, key: &GroupKey) -> Option<&ProcessingGroup> {
        self.index.get(key).map(|&idx| &self.groups[idx])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in creation order
    pub fn into_groups(self) -> Vec<ProcessingGroup> {
        self.groups
    }

    fn insert(&mut self, group: ProcessingGroup) {
        debug!("Created group {:?}", group.key());
        self.index.insert(group.key().clone(), self.groups.len());
        self.groups.push(group);
    }

    fn route_to_scope(&mut self, scope: PathBuf, path: &Path) -> Result<Routing> {
        let key = GroupKey::Scope(scope.clone());

        if let Some(&idx) = self.index.get(&key) {
            let group = &mut self.groups[idx];
            if is_tsconfig_file_name(path) {
                group.process_all_files();
                return Ok(Routing::Routed(key));
            }
            return Ok(match group.workspace.get_source_file(path)? {
                LoadOutcome::Loaded(_) => {
                    group.add_member(path);
                    Routing::Routed(key)
                }
                LoadOutcome::NotFound => {
                    debug!("{} is outside the project of {}", path.display(), scope.display());
                    Routing::NotFound
                }
            });
        }

        let style = resolve_style(path);
        let mut workspace = match Project::from_tsconfig(&scope, style.manipulation_settings()) {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!("Could not load {}, grouping its files ad hoc: {:#}", scope.display(), e);
                self.failed_scopes.insert(scope);
                return Ok(Routing::NotFound);
            }
        };

        if is_tsconfig_file_name(path) {
            info!("Processing every file of {}", scope.display());
            self.insert(ProcessingGroup::new(
                key.clone(),
                workspace,
                GroupScope::AllFiles,
                style.auto_detect_line_ending,
            ));
            return Ok(Routing::Routed(key));
        }

        match workspace.get_source_file(path)? {
            LoadOutcome::Loaded(_) => {
                self.insert(ProcessingGroup::new(
                    key.clone(),
                    workspace,
                    GroupScope::SelectedFiles(vec![path.to_path_buf()]),
                    style.auto_detect_line_ending,
                ));
                Ok(Routing::Routed(key))
            }
            LoadOutcome::NotFound => {
                debug!("{} is outside the project of {}", path.display(), scope.display());
                Ok(Routing::NotFound)
            }
        }
    }

    fn route_ad_hoc(&mut self, path: &Path) -> Result<GroupKey> {
        if is_tsconfig_file_name(path) {
            bail!("{} is a configuration file without a usable project", path.display());
        }

        let style = resolve_style(path);
        let key = GroupKey::AdHoc(style);

        if let Some(&idx) = self.index.get(&key) {
            let group = &mut self.groups[idx];
            group.workspace.add_source_file(path)?;
            group.add_member(path);
            return Ok(key);
        }

        let mut workspace = Project::ad_hoc(style.manipulation_settings());
        workspace.add_source_file(path)?;
        self.insert(ProcessingGroup::new(
            key.clone(),
            workspace,
            GroupScope::SelectedFiles(vec![path.to_path_buf()]),
            style.auto_detect_line_ending,
        ));
        Ok(key)
    }
}
