//! Constants shared by tsconfig loading, parsing and the run loop.
//!
//! ## Supported Extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)
//!
//! JavaScript files only belong to a tsconfig project when
//! `compilerOptions.allowJs` is set.

/// Extensions every tsconfig project picks up
pub const TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
];

/// Extensions added to a tsconfig project by `allowJs`
pub const JS_EXTENSIONS: &[&str] = &[
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Files containing this substring are never organized
pub const IGNORE_MARKER: &str = "// organize-imports-ignore";

/// Name of the file that owns a configuration scope
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Exclude patterns used when a tsconfig declares none
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Include pattern used when a tsconfig declares neither `files` nor `include`
pub const DEFAULT_INCLUDE: &str = "**/*";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_sets_are_disjoint() {
        for ext in TS_EXTENSIONS {
            assert!(!JS_EXTENSIONS.contains(ext), "'{}' listed as both TS and JS", ext);
        }
        assert_eq!(TS_EXTENSIONS.len() + JS_EXTENSIONS.len(), 8);
    }

    #[test]
    fn test_ignore_marker_is_a_line_comment() {
        assert!(IGNORE_MARKER.starts_with("//"));
    }
}
