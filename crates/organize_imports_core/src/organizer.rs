//! Canonical ordering of import declarations.
//!
//! Imports are organized per block: a run of consecutive top-level import
//! declarations with no other statement, blank line or side-effect import
//! between them. Inside a block declarations are sorted by module specifier,
//! bindings the file never references are removed and declarations of the
//! same specifier are coalesced. A block that is already canonical is left
//! byte-for-byte untouched, which makes the transform idempotent.

use anyhow::Result;
use log::{debug, trace};
use std::{cmp::Ordering, collections::HashSet, ops::Range, path::Path};

use crate::{
    parser::{ImportDecl, NamedImport, parse_imports},
    types::ManipulationSettings,
};

/// A declaration together with the comments that travel with it.
struct Entry<'t> {
    decl: &'t ImportDecl,
    /// Comment lines directly above the declaration
    leading: &'t str,
    body: &'t str,
    /// Comment on the same line after the declaration
    trailing: &'t str,
}

enum Output<'t> {
    /// Entry at this block position, emitted verbatim
    Original(usize),
    Rendered { leading: Vec<&'t str>, text: String, trailing: Vec<&'t str> },
}

/// Returns `text` with every import block in canonical order.
pub fn organize_imports(path: &Path, text: &str, settings: &ManipulationSettings) -> Result<String> {
    let decls = parse_imports(path, text)?;
    let blocks = split_blocks(text, &decls);
    trace!("{} has {} import blocks", path.display(), blocks.len());

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for block in blocks {
        let block_decls = &decls[block];
        let last = &block_decls[block_decls.len() - 1];
        let last_trailing = trailing_comment(text, last.end);
        let Some(replacement) = organize_block(text, block_decls, last_trailing, settings) else {
            continue;
        };
        let start = block_decls[0].start;
        let mut end = last.end + last_trailing.len();
        // The line break closing the block belongs to it.
        let terminated = match line_terminator_len(&text[end..]) {
            Some(len) => {
                end += len;
                true
            }
            None => false,
        };
        out.push_str(&text[cursor..start]);
        out.push_str(&replacement);
        if terminated && !replacement.is_empty() {
            out.push_str(settings.new_line_kind.as_str());
        }
        cursor = end;
        rewritten += 1;
    }
    out.push_str(&text[cursor..]);

    debug!("Rewrote {} import blocks in {}", rewritten, path.display());
    Ok(out)
}

fn split_blocks(text: &str, decls: &[ImportDecl]) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;

    for (i, decl) in decls.iter().enumerate() {
        if decl.side_effect {
            if let Some(s) = start.take() {
                blocks.push(s..i);
            }
            continue;
        }
        if let Some(s) = start {
            let prev = &decls[i - 1];
            let adjacent = prev.statement_index + 1 == decl.statement_index;
            if !adjacent || has_blank_line(&text[prev.end..decl.start]) {
                blocks.push(s..i);
                start = Some(i);
            }
        } else {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        blocks.push(s..decls.len());
    }
    blocks
}

fn has_blank_line(gap: &str) -> bool {
    let lines: Vec<&str> = gap.split('\n').collect();
    lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty())
}

/// Splits the text between two declarations into the first one's same-line
/// comment and the second one's leading comments.
fn split_gap(gap: &str) -> (&str, &str) {
    match gap.find('\n') {
        Some(nl) => (gap[..nl].trim_end(), gap[nl + 1..].trim()),
        None => ("", gap.trim()),
    }
}

/// Comment after the declaration ending at `end`, up to the end of its line.
fn trailing_comment(text: &str, end: usize) -> &str {
    let rest = &text[end..];
    let line = rest[..rest.find('\n').unwrap_or(rest.len())].trim_end();
    let comment = line.trim_start();
    let is_comment = comment.starts_with("//")
        || (comment.starts_with("/*") && comment.find("*/") == Some(comment.len() - 2));
    if is_comment { line } else { "" }
}

fn line_terminator_len(rest: &str) -> Option<usize> {
    let blanks = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after = &rest[blanks..];
    if after.starts_with("\r\n") {
        Some(blanks + 2)
    } else if after.starts_with('\n') {
        Some(blanks + 1)
    } else {
        None
    }
}

fn organize_block<'t>(
    text: &'t str,
    decls: &'t [ImportDecl],
    last_trailing: &'t str,
    settings: &ManipulationSettings,
) -> Option<String> {
    let mut entries: Vec<Entry<'t>> = decls
        .iter()
        .map(|decl| Entry { decl, leading: "", body: decl.text(text), trailing: "" })
        .collect();
    for i in 1..decls.len() {
        let (trailing, leading) = split_gap(&text[decls[i - 1].end..decls[i].start]);
        entries[i - 1].trailing = trailing;
        entries[i].leading = leading;
    }
    if let Some(last) = entries.last_mut() {
        last.trailing = last_trailing;
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| compare_declarations(entries[a].decl, entries[b].decl));

    let mut outputs = Vec::new();
    let mut group_start = 0;
    while group_start < order.len() {
        let first = entries[order[group_start]].decl;
        let mut group_end = group_start + 1;
        while group_end < order.len() {
            let next = entries[order[group_end]].decl;
            if next.source != first.source || next.is_type != first.is_type {
                break;
            }
            group_end += 1;
        }
        coalesce(&entries, &order[group_start..group_end], settings, &mut outputs);
        group_start = group_end;
    }

    let unchanged = outputs.len() == entries.len()
        && outputs
            .iter()
            .enumerate()
            .all(|(pos, out)| matches!(out, Output::Original(i) if *i == pos));
    if unchanged {
        return None;
    }

    let nl = settings.new_line_kind.as_str();
    let rendered: Vec<String> = outputs
        .iter()
        .map(|out| match out {
            Output::Original(i) => {
                let e = &entries[*i];
                join_with_comments(&[e.leading], e.body, &[e.trailing], nl)
            }
            Output::Rendered { leading, text, trailing } => {
                join_with_comments(leading, text, trailing, nl)
            }
        })
        .collect();
    Some(rendered.join(nl))
}

fn join_with_comments(leading: &[&str], body: &str, trailing: &[&str], nl: &str) -> String {
    let mut s = String::new();
    for comment in leading.iter().filter(|c| !c.is_empty()) {
        s.push_str(comment);
        s.push_str(nl);
    }
    s.push_str(body);
    for comment in trailing.iter().filter(|c| !c.is_empty()) {
        s.push_str(comment);
    }
    s
}

/// Coalesces declarations that share specifier and kind into `outputs`:
/// namespace imports first, then the merged default/named import, then
/// declarations with attributes. Declarations with no referenced binding
/// are dropped along with their comments.
fn coalesce<'t>(
    entries: &[Entry<'t>],
    group: &[usize],
    settings: &ManipulationSettings,
    outputs: &mut Vec<Output<'t>>,
) {
    let mut namespaces = Vec::new();
    let mut mergeable = Vec::new();
    let mut attributed = Vec::new();
    for &i in group {
        let decl = entries[i].decl;
        if decl.is_unused() {
            trace!("Removing unused import of '{}'", decl.source);
        } else if decl.has_attributes {
            attributed.push(i);
        } else if decl.used_namespace().is_some() {
            namespaces.push(i);
        } else {
            mergeable.push(i);
        }
    }

    let mut seen_namespaces = HashSet::new();
    for i in namespaces {
        let e = &entries[i];
        if e.decl.default.is_some() && e.decl.used_default().is_none() {
            let text = render_import(
                &e.decl.source,
                e.decl.is_type,
                None,
                e.decl.namespace.as_deref(),
                &[],
                false,
                false,
                e.body.trim_end().ends_with(';'),
                settings,
            );
            outputs.push(Output::Rendered { leading: vec![e.leading], text, trailing: vec![e.trailing] });
            continue;
        }
        let key = (e.decl.default.clone(), e.decl.namespace.clone());
        let has_comments = !e.leading.is_empty() || !e.trailing.is_empty();
        if seen_namespaces.insert(key) || has_comments {
            outputs.push(Output::Original(i));
        } else {
            trace!("Dropping duplicate namespace import of '{}'", e.decl.source);
        }
    }

    let defaults: HashSet<&str> =
        mergeable.iter().filter_map(|&i| entries[i].decl.used_default()).collect();
    let is_type = entries[group[0]].decl.is_type;
    let can_merge = defaults.len() <= 1 && !(is_type && !defaults.is_empty());

    if can_merge && !mergeable.is_empty() {
        outputs.push(merge(entries, &mergeable, settings));
    } else {
        for i in mergeable {
            outputs.push(merge(entries, &[i], settings));
        }
    }

    outputs.extend(attributed.into_iter().map(Output::Original));
}

fn merge<'t>(entries: &[Entry<'t>], members: &[usize], settings: &ManipulationSettings) -> Output<'t> {
    let first = &entries[members[0]];
    let mut named: Vec<NamedImport> = members
        .iter()
        .flat_map(|&i| entries[i].decl.named.iter().filter(|n| n.used).cloned())
        .collect();
    normalize_named(&mut named);
    let default = members.iter().find_map(|&i| entries[i].decl.used_default());

    if members.len() == 1
        && named == first.decl.named
        && default == first.decl.default.as_deref()
        && first.decl.namespace.is_none()
    {
        return Output::Original(members[0]);
    }

    let has_braces = members.iter().any(|&i| entries[i].decl.has_braces);
    let multiline = members.iter().any(|&i| entries[i].body.contains('\n'));
    let semicolon = first.body.trim_end().ends_with(';');

    let text = render_import(
        &first.decl.source,
        first.decl.is_type,
        default,
        None,
        &named,
        has_braces,
        multiline,
        semicolon,
        settings,
    );
    trace!("Rendered merged import: {}", text);

    Output::Rendered {
        leading: members.iter().map(|&i| entries[i].leading).collect(),
        text,
        trailing: members.iter().map(|&i| entries[i].trailing).collect(),
    }
}

/// Sorts and de-duplicates specifiers. A binding imported both as a value and
/// as a type keeps only the value specifier.
fn normalize_named(named: &mut Vec<NamedImport>) {
    let values: HashSet<(String, String)> = named
        .iter()
        .filter(|n| !n.is_type)
        .map(|n| (n.imported.clone(), n.local.clone()))
        .collect();
    named.retain(|n| !n.is_type || !values.contains(&(n.imported.clone(), n.local.clone())));
    named.sort_by(|a, b| {
        compare_case_insensitive(&a.imported, &b.imported)
            .then_with(|| a.local.cmp(&b.local))
            .then_with(|| a.is_type.cmp(&b.is_type))
    });
    named.dedup();
}

#[allow(clippy::too_many_arguments)]
fn render_import(
    source: &str,
    is_type: bool,
    default: Option<&str>,
    namespace: Option<&str>,
    named: &[NamedImport],
    has_braces: bool,
    multiline: bool,
    semicolon: bool,
    settings: &ManipulationSettings,
) -> String {
    let quote = settings.quote_style.as_char();
    let mut s = String::from("import ");
    if is_type {
        s.push_str("type ");
    }

    if let Some(default) = default {
        s.push_str(default);
        if !named.is_empty() || namespace.is_some() {
            s.push_str(", ");
        }
    }

    if let Some(namespace) = namespace {
        s.push_str("* as ");
        s.push_str(namespace);
    } else if !named.is_empty() || (has_braces && default.is_none()) {
        let specs: Vec<String> = named.iter().map(|n| render_named(n, is_type, quote)).collect();
        if specs.is_empty() {
            s.push_str("{}");
        } else if multiline {
            let nl = settings.new_line_kind.as_str();
            let indent = settings.indent_unit.as_str();
            s.push('{');
            s.push_str(nl);
            for (idx, spec) in specs.iter().enumerate() {
                s.push_str(indent);
                s.push_str(spec);
                if idx + 1 < specs.len() {
                    s.push(',');
                }
                s.push_str(nl);
            }
            s.push('}');
        } else {
            s.push_str("{ ");
            s.push_str(&specs.join(", "));
            s.push_str(" }");
        }
    }

    s.push_str(" from ");
    s.push_str(&quote_string(source, quote));
    if semicolon {
        s.push(';');
    }
    s
}

fn render_named(named: &NamedImport, decl_is_type: bool, quote: char) -> String {
    let mut s = String::new();
    if named.is_type && !decl_is_type {
        s.push_str("type ");
    }
    if named.imported_is_string {
        s.push_str(&quote_string(&named.imported, quote));
        s.push_str(" as ");
        s.push_str(&named.local);
    } else if named.imported != named.local {
        s.push_str(&named.imported);
        s.push_str(" as ");
        s.push_str(&named.local);
    } else {
        s.push_str(&named.local);
    }
    s
}

fn quote_string(value: &str, quote: char) -> String {
    let escaped = value.replace('\\', "\\\\").replace(quote, &format!("\\{}", quote));
    format!("{}{}{}", quote, escaped, quote)
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Packages before relative paths, then by specifier, value imports before type imports.
fn compare_declarations(a: &ImportDecl, b: &ImportDecl) -> Ordering {
    is_relative_specifier(&a.source)
        .cmp(&is_relative_specifier(&b.source))
        .then_with(|| compare_case_insensitive(&a.source, &b.source))
        .then_with(|| a.is_type.cmp(&b.is_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndentUnit, NewLineKind};

    fn organize(name: &str, text: &str) -> String {
        organize_imports(Path::new(name), text, &ManipulationSettings::default()).unwrap()
    }

    fn named(imported: &str, is_type: bool) -> NamedImport {
        NamedImport {
            imported: imported.to_string(),
            imported_is_string: false,
            local: imported.to_string(),
            is_type,
            used: true,
        }
    }

    #[test]
    fn test_reorders_declarations() {
        let text = "import {b} from \"./b\"; import {a} from \"./a\";\nb(a);\n";
        let out = organize("a.js", text);
        assert_eq!(out, "import {a} from \"./a\";\nimport {b} from \"./b\";\nb(a);\n");
    }

    #[test]
    fn test_organized_file_is_untouched() {
        let text = "import React from \"react\";\nimport { a } from \"./a\";\n\nfoo(React, a);\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "import { z, a } from './z';\nimport b from 'b';\nimport { y } from './z';\nuse(z, a, b, y);\n";
        let once = organize("a.ts", text);
        let twice = organize("a.ts", &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_packages_before_relative() {
        let text = "import a from './a';\nimport Z from 'Zed';\nimport b from 'alpha';\nlog(a, Z, b);\n";
        let out = organize("a.js", text);
        assert_eq!(
            out,
            "import b from 'alpha';\nimport Z from 'Zed';\nimport a from './a';\nlog(a, Z, b);\n"
        );
    }

    #[test]
    fn test_merges_same_specifier() {
        let text = "import { b } from './x';\nimport D from './x';\nimport { a, b } from './x';\nlog(a, b, D);\n";
        let out = organize("a.js", text);
        assert_eq!(out, "import D, { a, b } from './x';\nlog(a, b, D);\n");
    }

    #[test]
    fn test_sorts_named_specifiers_with_single_quotes() {
        let text = "import { c, B as bee, a } from \"./x\"\nlog(a, bee, c);\n";
        let out = organize("a.js", text);
        assert_eq!(out, "import { a, B as bee, c } from './x'\nlog(a, bee, c);\n");
    }

    #[test]
    fn test_does_not_merge_distinct_defaults() {
        let text = "import B from './x';\nimport A from './x';\nlog(A, B);\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_drops_duplicate_namespace_import() {
        let text = "import * as x from './x';\nimport * as x from './x';\nx();\n";
        assert_eq!(organize("a.js", text), "import * as x from './x';\nx();\n");
    }

    #[test]
    fn test_type_imports_stay_separate() {
        let text = "import type { T } from './x';\nimport { v } from './x';\nexport const y: T = v;\n";
        let out = organize("a.ts", text);
        assert_eq!(out, "import { v } from './x';\nimport type { T } from './x';\nexport const y: T = v;\n");
    }

    #[test]
    fn test_value_and_type_specifier_of_same_binding_merge_to_value() {
        let text = "import { type A } from './x';\nimport { A } from './x';\nexport const a: A = new A();\n";
        let out = organize("a.ts", text);
        assert_eq!(out, "import { A } from './x';\nexport const a: A = new A();\n");
    }

    #[test]
    fn test_normalize_named_prefers_value_specifier() {
        let mut specs = vec![named("b", false), named("A", true), named("A", false), named("C", true)];
        normalize_named(&mut specs);
        assert_eq!(specs, vec![named("A", false), named("b", false), named("C", true)]);
    }

    #[test]
    fn test_blank_line_separates_blocks() {
        let text = "import b from 'b';\n\nimport a from 'a';\nlog(a, b);\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_side_effect_import_is_a_barrier() {
        let text = "import b from 'b';\nimport 'polyfill';\nimport a from 'a';\nlog(a, b);\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_comments_travel_with_declarations() {
        let text = "// header\nimport b from 'b'; // bee\n// about a\nimport a from 'a';\nlog(a, b);\n";
        let out = organize("a.js", text);
        assert_eq!(
            out,
            "// header\n// about a\nimport a from 'a';\nimport b from 'b'; // bee\nlog(a, b);\n"
        );
    }

    #[test]
    fn test_comment_after_last_declaration_travels_with_it() {
        let text = "import b from 'b';\nimport a from 'a'; // about a\nlog(a, b);\n";
        let out = organize("a.js", text);
        assert_eq!(out, "import a from 'a'; // about a\nimport b from 'b';\nlog(a, b);\n");
    }

    #[test]
    fn test_code_after_last_declaration_stays_in_place() {
        let text = "import b from 'b';\nimport a from 'a'; log(a, b);\n";
        let out = organize("a.js", text);
        assert_eq!(out, "import a from 'a';\nimport b from 'b'; log(a, b);\n");
    }

    #[test]
    fn test_multiline_rendering_uses_indent_and_newline() {
        let settings = ManipulationSettings {
            indent_unit: IndentUnit::TwoSpaces,
            new_line_kind: NewLineKind::CarriageReturnLineFeed,
            ..Default::default()
        };
        let text = "import {\r\n  b,\r\n  a\r\n} from './x';\r\nlog(a, b);\r\n";
        let out = organize_imports(Path::new("a.js"), text, &settings).unwrap();
        assert_eq!(out, "import {\r\n  a,\r\n  b\r\n} from './x';\r\nlog(a, b);\r\n");
    }

    #[test]
    fn test_rewritten_block_uses_newline_throughout() {
        let settings = ManipulationSettings {
            new_line_kind: NewLineKind::CarriageReturnLineFeed,
            ..Default::default()
        };
        let text = "import b from 'b';\nimport a from 'a';\nlog(a, b);\n";
        let out = organize_imports(Path::new("a.js"), text, &settings).unwrap();
        assert_eq!(out, "import a from 'a';\r\nimport b from 'b';\r\nlog(a, b);\n");
    }

    #[test]
    fn test_attributes_are_kept_verbatim() {
        let text = "import b from './b.json' with { type: \"json\" };\nimport a from './a';\nlog(a, b);\n";
        let out = organize("a.js", text);
        assert_eq!(
            out,
            "import a from './a';\nimport b from './b.json' with { type: \"json\" };\nlog(a, b);\n"
        );
    }

    #[test]
    fn test_inline_type_specifier_rendering() {
        let text = "import { type B, a } from './x';\nimport { c } from './x';\nexport const v: B = a(c);\n";
        let out = organize("a.ts", text);
        assert_eq!(out, "import { a, type B, c } from './x';\nexport const v: B = a(c);\n");
    }

    #[test]
    fn test_non_contiguous_imports_are_separate_blocks() {
        let text = "import b from 'b';\nconst x = 1;\nimport a from 'a';\nlog(a, b, x);\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_removes_unused_specifiers_and_declarations() {
        let text = "import { a, b } from './x';\nimport c from 'c';\nlog(a);\n";
        assert_eq!(organize("a.js", text), "import { a } from './x';\nlog(a);\n");
    }

    #[test]
    fn test_removes_fully_unused_block() {
        let text = "// header\nimport a from 'a';\nimport { b } from './b';\nfoo();\n";
        assert_eq!(organize("a.js", text), "// header\nfoo();\n");
    }

    #[test]
    fn test_side_effect_imports_survive_pruning() {
        let text = "import 'polyfill';\nfoo();\n";
        assert_eq!(organize("a.js", text), text);
    }

    #[test]
    fn test_unused_default_next_to_namespace() {
        let text = "import D, * as ns from './x';\nns.run();\n";
        assert_eq!(organize("a.js", text), "import * as ns from './x';\nns.run();\n");
    }

    #[test]
    fn test_unused_namespace_next_to_default() {
        let text = "import D, * as ns from './x';\nD();\n";
        assert_eq!(organize("a.js", text), "import D from './x';\nD();\n");
    }

    #[test]
    fn test_type_only_usage_keeps_import() {
        let text = "import { T } from './t';\nexport let v: T;\n";
        assert_eq!(organize("a.ts", text), text);
    }

    #[test]
    fn test_jsx_keeps_react_import() {
        let text = "import React from 'react';\nexport const el = <div />;\n";
        assert_eq!(organize("a.jsx", text), text);
    }
}
