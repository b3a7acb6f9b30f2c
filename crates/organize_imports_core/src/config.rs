use anyhow::{Context, Result, anyhow};
use ignore::{
    WalkBuilder,
    overrides::{Override, OverrideBuilder},
};
use log::{debug, trace, warn};
use path_clean::clean;
use serde::Deserialize;
use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
};

use crate::constants::{
    DEFAULT_EXCLUDES, DEFAULT_INCLUDE, JS_EXTENSIONS, TS_EXTENSIONS, TSCONFIG_FILE_NAME,
};

const MAX_EXTENDS_DEPTH: usize = 8;

/// Absolutize against the current directory and clean `.`/`..` segments lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return clean(path);
    }
    match env::current_dir() {
        Ok(cwd) => clean(cwd.join(path)),
        Err(_) => clean(path),
    }
}

/// Finds the nearest `tsconfig.json` starting at `dir` and walking up.
pub fn find_tsconfig(dir: &Path) -> Option<PathBuf> {
    let mut current_dir = normalize_path(dir);
    trace!("Searching for {} from: {:?}", TSCONFIG_FILE_NAME, current_dir);

    loop {
        let candidate = current_dir.join(TSCONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Found tsconfig at: {:?}", candidate);
            return Some(candidate);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                trace!("No {} above {:?}", TSCONFIG_FILE_NAME, dir);
                return None;
            }
        }
    }
}

/// Scope owning `file`: the tsconfig found from its directory upwards.
pub fn locate_config_scope(file: &Path) -> Option<PathBuf> {
    let file = normalize_path(file);
    let dir = file.parent().unwrap_or(&file);
    find_tsconfig(dir)
}

/// Matches `tsconfig.json`, `tsconfig.build.json`, `TSConfig.json`, ...
pub fn is_tsconfig_file_name(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
        let name = name.to_lowercase();
        name.starts_with("tsconfig") && name.ends_with(".json")
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<serde_json::Value>,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    allow_js: Option<bool>,
    out_dir: Option<String>,
}

/// The parts of a tsconfig that decide which files belong to its project.
#[derive(Debug, Clone)]
pub struct TsConfig {
    pub path: PathBuf,
    pub files: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub allow_js: bool,
    pub out_dir: Option<String>,
}

impl TsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let path = normalize_path(path);
        let raw = read_raw_tsconfig(&path)?;

        let (allow_js, out_dir) = inherited_compiler_options(&path, &raw, 0);

        let files = raw.files.unwrap_or_default();
        let include = match raw.include {
            Some(include) => include,
            None if files.is_empty() => vec![DEFAULT_INCLUDE.to_string()],
            None => Vec::new(),
        };
        let exclude = match raw.exclude {
            Some(exclude) => exclude,
            None => {
                let mut exclude: Vec<String> =
                    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
                if let Some(out_dir) = &out_dir {
                    exclude.push(out_dir.clone());
                }
                exclude
            }
        };

        debug!(
            "Loaded tsconfig {}: {} files, {} include, {} exclude, allowJs={}",
            path.display(),
            files.len(),
            include.len(),
            exclude.len(),
            allow_js
        );

        Ok(Self { path, files, include, exclude, allow_js, out_dir })
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        TS_EXTENSIONS.contains(&ext) || (self.allow_js && JS_EXTENSIONS.contains(&ext))
    }

    /// Every source file this tsconfig selects: `files` first, then `include`
    /// matches in walk order.
    pub fn file_names(&self) -> Result<Vec<PathBuf>> {
        let dir = self.dir().to_path_buf();
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for file in &self.files {
            let p = clean(dir.join(file));
            if seen.insert(p.clone()) {
                trace!("Explicit tsconfig file: {}", p.display());
                result.push(p);
            }
        }

        if self.include.is_empty() {
            return Ok(result);
        }

        let include = build_globs(&dir, &self.include, true)?;
        let exclude = build_globs(&dir, &self.exclude, false)?;

        let prune = exclude.clone();
        let walker = WalkBuilder::new(&dir)
            .hidden(true)
            // tsconfig selection knows nothing about ignore files
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && prune.matched(entry.path(), true).is_whitelist())
            })
            .build();

        for res in walker {
            let dent = res?;
            let p = dent.path();
            if !dent.file_type().is_some_and(|t| t.is_file()) || !self.accepts_extension(p) {
                continue;
            }
            if !include.matched(p, false).is_whitelist() {
                continue;
            }
            if exclude.matched(p, false).is_whitelist() {
                trace!("Excluded by tsconfig: {}", p.display());
                continue;
            }
            let p = clean(p);
            if seen.insert(p.clone()) {
                result.push(p);
            }
        }

        debug!("tsconfig {} selects {} files", self.path.display(), result.len());
        Ok(result)
    }
}

fn read_raw_tsconfig(path: &Path) -> Result<RawTsConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = jsonc_parser::parse_to_serde_value(&content, &Default::default())
        .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
    match value {
        Some(value) => serde_json::from_value(value)
            .with_context(|| format!("Unexpected tsconfig shape in {}", path.display())),
        None => Ok(RawTsConfig::default()),
    }
}

/// `allowJs` and `outDir` follow `extends` chains of relative paths.
fn inherited_compiler_options(
    path: &Path,
    raw: &RawTsConfig,
    depth: usize,
) -> (bool, Option<String>) {
    let mut allow_js = raw.compiler_options.allow_js;
    let mut out_dir = raw.compiler_options.out_dir.clone();

    if (allow_js.is_none() || out_dir.is_none())
        && depth < MAX_EXTENDS_DEPTH
        && let Some(base_path) = extends_path(path, raw)
    {
        match read_raw_tsconfig(&base_path) {
            Ok(base) => {
                let (base_allow_js, base_out_dir) =
                    inherited_compiler_options(&base_path, &base, depth + 1);
                allow_js = allow_js.or(Some(base_allow_js));
                if out_dir.is_none() {
                    // outDir in a base config is relative to the base config
                    out_dir = base_out_dir.and_then(|d| {
                        let abs = clean(base_path.parent()?.join(d));
                        let dir = path.parent()?;
                        abs.strip_prefix(dir).ok().map(|p| p.to_string_lossy().to_string())
                    });
                }
            }
            Err(e) => warn!("Ignoring extends of {}: {}", path.display(), e),
        }
    }

    (allow_js.unwrap_or(false), out_dir)
}

fn extends_path(path: &Path, raw: &RawTsConfig) -> Option<PathBuf> {
    let extends = raw.extends.as_ref()?.as_str()?;
    if !(extends.starts_with("./") || extends.starts_with("../")) {
        trace!("Skipping non-relative extends '{}' in {}", extends, path.display());
        return None;
    }
    let file = if extends.ends_with(".json") {
        extends.to_string()
    } else {
        format!("{}.json", extends)
    };
    Some(clean(path.parent()?.join(file)))
}

/// A last segment with no wildcard and no extension names a directory.
fn expand_include_pattern(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./");
    let last = pattern.rsplit('/').next().unwrap_or(pattern);
    let has_wildcard = last.contains('*') || last.contains('?');
    if !has_wildcard && !last.contains('.') {
        format!("{}/**/*", pattern.trim_end_matches('/'))
    } else {
        pattern.to_string()
    }
}

fn build_globs(dir: &Path, patterns: &[String], is_include: bool) -> Result<Override> {
    let mut builder = OverrideBuilder::new(dir);
    for pattern in patterns {
        let glob = if is_include {
            expand_include_pattern(pattern)
        } else {
            pattern.trim_start_matches("./").trim_end_matches('/').to_string()
        };
        trace!("tsconfig glob '{}' -> '{}'", pattern, glob);
        builder
            .add(&glob)
            .with_context(|| format!("Invalid tsconfig pattern '{}'", pattern))?;
    }
    Ok(builder.build()?)
}
