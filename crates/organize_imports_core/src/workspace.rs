use anyhow::{Context, Result};
use log::{debug, info, trace};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{TsConfig, normalize_path},
    organizer::organize_imports,
    parser::import_declarations,
    types::{FileId, LoadOutcome, ManipulationSettings, NewLineKind},
};

/// A set of loaded source files sharing manipulation settings.
///
/// Text changes stay in memory until [`Workspace::save`] writes them back.
pub trait Workspace {
    fn settings(&self) -> &ManipulationSettings;

    /// Switches the newline used for generated text, including text already generated.
    fn set_new_line_kind(&mut self, kind: NewLineKind) -> Result<()>;

    /// Looks `path` up among the files this workspace knows about, loading it if needed.
    fn get_source_file(&mut self, path: &Path) -> Result<LoadOutcome>;

    /// Loads an existing file from disk into the workspace.
    fn add_source_file(&mut self, path: &Path) -> Result<FileId>;

    /// Every file the workspace knows about, loaded, in enumeration order.
    fn source_files(&mut self) -> Result<Vec<FileId>>;

    fn file_path(&self, id: FileId) -> &Path;

    fn full_text(&self, id: FileId) -> &str;

    fn import_declarations(&self, id: FileId) -> Result<Vec<String>>;

    fn organize_imports(&mut self, id: FileId) -> Result<()>;

    /// Writes every file whose text changed; returns how many were written.
    fn save(&mut self) -> Result<usize>;
}

#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    /// Text as loaded from (or last written to) disk
    original: String,
    text: String,
    organized: bool,
}

/// Workspace backed by the filesystem.
///
/// A project built from a tsconfig knows that config's file set and loads
/// members lazily. An ad-hoc project knows only the files added to it.
#[derive(Debug)]
pub struct Project {
    settings: ManipulationSettings,
    config_path: Option<PathBuf>,
    known_files: Vec<PathBuf>,
    known_index: HashSet<PathBuf>,
    files: Vec<SourceFile>,
    index: HashMap<PathBuf, FileId>,
}

impl Project {
    pub fn from_tsconfig(config_path: &Path, settings: ManipulationSettings) -> Result<Self> {
        let tsconfig = TsConfig::load(config_path)?;
        let known_files = tsconfig.file_names()?;
        info!(
            "Created project for {} with {} files",
            tsconfig.path.display(),
            known_files.len()
        );
        Ok(Self {
            settings,
            config_path: Some(tsconfig.path.clone()),
            known_index: known_files.iter().cloned().collect(),
            known_files,
            files: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Project with no tsconfig; any file added to it is accepted.
    pub fn ad_hoc(settings: ManipulationSettings) -> Self {
        debug!("Created ad-hoc project with {:?}", settings);
        Self {
            settings,
            config_path: None,
            known_files: Vec::new(),
            known_index: HashSet::new(),
            files: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn load(&mut self, path: PathBuf) -> Result<FileId> {
        if let Some(id) = self.index.get(&path) {
            return Ok(*id);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        trace!("Loaded {} ({} bytes)", path.display(), text.len());
        let id = FileId(self.files.len());
        self.files.push(SourceFile { path: path.clone(), original: text.clone(), text, organized: false });
        self.index.insert(path, id);
        Ok(id)
    }
}

impl Workspace for Project {
    fn settings(&self) -> &ManipulationSettings {
        &self.settings
    }

    fn set_new_line_kind(&mut self, kind: NewLineKind) -> Result<()> {
        if self.settings.new_line_kind == kind {
            return Ok(());
        }
        debug!("Switching new line kind to {:?}", kind);
        self.settings.new_line_kind = kind;
        let settings = self.settings;
        for file in self.files.iter_mut().filter(|f| f.organized) {
            file.text = organize_imports(&file.path, &file.original, &settings)?;
        }
        Ok(())
    }

    fn get_source_file(&mut self, path: &Path) -> Result<LoadOutcome> {
        let path = normalize_path(path);
        if let Some(id) = self.index.get(&path) {
            return Ok(LoadOutcome::Loaded(*id));
        }
        if !self.known_index.contains(&path) {
            trace!("{} is not part of this project", path.display());
            return Ok(LoadOutcome::NotFound);
        }
        Ok(LoadOutcome::Loaded(self.load(path)?))
    }

    fn add_source_file(&mut self, path: &Path) -> Result<FileId> {
        self.load(normalize_path(path))
    }

    fn source_files(&mut self) -> Result<Vec<FileId>> {
        let known = self.known_files.clone();
        let mut ids = Vec::with_capacity(known.len().max(self.files.len()));
        for path in known {
            ids.push(self.load(path)?);
        }
        for id in (0..self.files.len()).map(FileId) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn file_path(&self, id: FileId) -> &Path {
        &self.files[id.0].path
    }

    fn full_text(&self, id: FileId) -> &str {
        &self.files[id.0].text
    }

    fn import_declarations(&self, id: FileId) -> Result<Vec<String>> {
        let file = &self.files[id.0];
        import_declarations(&file.path, &file.text)
    }

    fn organize_imports(&mut self, id: FileId) -> Result<()> {
        let settings = self.settings;
        let file = &mut self.files[id.0];
        file.text = organize_imports(&file.path, &file.text, &settings)?;
        file.organized = true;
        Ok(())
    }

    fn save(&mut self) -> Result<usize> {
        let mut written = 0;
        for file in self.files.iter_mut().filter(|f| f.text != f.original) {
            fs::write(&file.path, &file.text)
                .with_context(|| format!("Failed to write {}", file.path.display()))?;
            debug!("Wrote {}", file.path.display());
            file.original = file.text.clone();
            written += 1;
        }
        info!("Saved {} files", written);
        Ok(written)
    }
}
