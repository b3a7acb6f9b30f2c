use anyhow::{Context, Result};
use ignore::overrides::OverrideBuilder;
use log::{debug, trace, warn};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::normalize_path,
    types::{IndentUnit, NewLineKind, QuoteStyle, StylePreferences},
};

const EDITORCONFIG_FILE_NAME: &str = ".editorconfig";

#[derive(Debug, Default)]
struct Section {
    glob: String,
    properties: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct EditorConfigFile {
    dir: PathBuf,
    root: bool,
    sections: Vec<Section>,
}

/// Resolves indentation, quotes and line endings for `file`.
///
/// Missing or unreadable `.editorconfig` files simply leave the defaults in place.
pub fn resolve_style(file: &Path) -> StylePreferences {
    let file = normalize_path(file);
    let properties = match editorconfig_properties(&file) {
        Ok(properties) => properties,
        Err(e) => {
            warn!("Failed to read editorconfig for {}: {}", file.display(), e);
            HashMap::new()
        }
    };
    let prefs = style_from_properties(&properties);
    debug!("Style for {}: {:?}", file.display(), prefs);
    prefs
}

fn style_from_properties(properties: &HashMap<String, String>) -> StylePreferences {
    let tab_width = properties
        .get("tab_width")
        .or_else(|| properties.get("indent_size"))
        .and_then(|v| v.parse::<u32>().ok());

    let indent_unit = if properties.get("indent_style").map(String::as_str) == Some("tab") {
        IndentUnit::Tab
    } else if tab_width == Some(2) {
        IndentUnit::TwoSpaces
    } else {
        IndentUnit::FourSpaces
    };

    let end_of_line = properties.get("end_of_line");
    let line_ending = if end_of_line.map(String::as_str) == Some("crlf") {
        NewLineKind::CarriageReturnLineFeed
    } else {
        NewLineKind::LineFeed
    };

    StylePreferences {
        indent_unit,
        line_ending,
        quote_style: QuoteStyle::Single,
        auto_detect_line_ending: end_of_line.is_some(),
    }
}

/// Effective properties for `file`, nearest `.editorconfig` winning.
fn editorconfig_properties(file: &Path) -> Result<HashMap<String, String>> {
    let mut configs = Vec::new();
    let mut current = file.parent();

    while let Some(dir) = current {
        let candidate = dir.join(EDITORCONFIG_FILE_NAME);
        if candidate.is_file() {
            trace!("Found editorconfig at: {:?}", candidate);
            let content = fs::read_to_string(&candidate)
                .with_context(|| format!("Failed to read {}", candidate.display()))?;
            let config = parse_editorconfig(dir, &content);
            let is_root = config.root;
            configs.push(config);
            if is_root {
                break;
            }
        }
        current = dir.parent();
    }

    let mut properties = HashMap::new();
    for config in configs.iter().rev() {
        for section in &config.sections {
            if !section_matches(&config.dir, &section.glob, file) {
                continue;
            }
            trace!("Section [{}] in {:?} applies", section.glob, config.dir);
            for (key, value) in &section.properties {
                if value == "unset" {
                    properties.remove(key);
                } else {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }
    }
    Ok(properties)
}

fn parse_editorconfig(dir: &Path, content: &str) -> EditorConfigFile {
    let mut config = EditorConfigFile { dir: dir.to_path_buf(), ..Default::default() };
    let mut current: Option<Section> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(glob) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some(section) = current.take() {
                config.sections.push(section);
            }
            current = Some(Section { glob: glob.to_string(), properties: Vec::new() });
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            trace!("Skipping malformed editorconfig line: {}", line);
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim().to_lowercase();

        match current.as_mut() {
            Some(section) => section.properties.push((key, value)),
            None if key == "root" => config.root = value == "true",
            None => {}
        }
    }

    if let Some(section) = current {
        config.sections.push(section);
    }
    config
}

/// Globs without `/` match the file name at any depth; others are anchored to
/// the directory holding the `.editorconfig`.
fn section_matches(dir: &Path, glob: &str, file: &Path) -> bool {
    let mut builder = OverrideBuilder::new(dir);
    if let Err(e) = builder.add(glob) {
        debug!("Ignoring editorconfig section [{}]: {}", glob, e);
        return false;
    }
    match builder.build() {
        Ok(matcher) => matcher.matched(file, false).is_whitelist(),
        Err(e) => {
            debug!("Ignoring editorconfig section [{}]: {}", glob, e);
            false
        }
    }
}
