use anyhow::{Result, bail};
use log::trace;
use oxc_allocator::Allocator;
use oxc_ast::{AstKind, ast::*};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_semantic::{Scoping, SemanticBuilder};
use oxc_span::SourceType;
use std::path::Path;

/// One binding inside `{ ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamedImport {
    pub(crate) imported: String,
    /// `import { "a-b" as ab }`
    pub(crate) imported_is_string: bool,
    pub(crate) local: String,
    pub(crate) is_type: bool,
    /// The local binding is referenced somewhere in the file
    pub(crate) used: bool,
}

/// Owned view of a top-level import declaration, detached from the oxc arena.
#[derive(Debug, Clone)]
pub(crate) struct ImportDecl {
    /// Position among the program's top-level statements
    pub(crate) statement_index: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) source: String,
    pub(crate) is_type: bool,
    pub(crate) default: Option<String>,
    pub(crate) default_used: bool,
    pub(crate) namespace: Option<String>,
    pub(crate) namespace_used: bool,
    pub(crate) named: Vec<NamedImport>,
    pub(crate) has_braces: bool,
    /// `import 'polyfill'`
    pub(crate) side_effect: bool,
    /// Import attributes or a phase modifier; such declarations are never rewritten.
    pub(crate) has_attributes: bool,
}

impl ImportDecl {
    pub(crate) fn text<'t>(&self, source_text: &'t str) -> &'t str {
        &source_text[self.start..self.end]
    }

    pub(crate) fn used_default(&self) -> Option<&str> {
        self.default.as_deref().filter(|_| self.default_used)
    }

    pub(crate) fn used_namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|_| self.namespace_used)
    }

    /// Declares bindings, none of which is referenced. Side-effect imports and
    /// `import {} from '...'` declare nothing and are never unused.
    pub(crate) fn is_unused(&self) -> bool {
        let declares_bindings =
            self.default.is_some() || self.namespace.is_some() || !self.named.is_empty();
        declares_bindings
            && self.used_default().is_none()
            && self.used_namespace().is_none()
            && self.named.iter().all(|n| !n.used)
    }
}

/// Parses `text` and returns its top-level import declarations in source order.
///
/// Any syntax error is fatal: organizing a file that does not parse would risk
/// rewriting it incorrectly.
pub(crate) fn parse_imports(path: &Path, text: &str) -> Result<Vec<ImportDecl>> {
    trace!("Parsing {} for import declarations", path.display());
    let st = source_type_for(path);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, text, st).parse();

    if let Some(error) = errors.first() {
        bail!("Failed to parse {}: {}", path.display(), error);
    }
    if panicked {
        bail!("Failed to parse {}", path.display());
    }

    let semantic = SemanticBuilder::new().build(&program).semantic;
    let scoping = semantic.scoping();
    // Classic JSX runtime compiles elements to `React.createElement`.
    let has_jsx = semantic
        .nodes()
        .iter()
        .any(|node| matches!(node.kind(), AstKind::JSXElement(_) | AstKind::JSXFragment(_)));
    let is_used = |binding: &BindingIdentifier| {
        (has_jsx && binding.name.as_str() == "React") || is_referenced(scoping, binding)
    };

    let mut decls = Vec::new();
    for (statement_index, stmt) in program.body.iter().enumerate() {
        let Statement::ImportDeclaration(decl) = stmt else {
            continue;
        };

        let mut default = None;
        let mut default_used = false;
        let mut namespace = None;
        let mut namespace_used = false;
        let mut named = Vec::new();
        let has_braces = match &decl.specifiers {
            Some(specifiers) => {
                for spec in specifiers {
                    match spec {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            default = Some(s.local.name.to_string());
                            default_used = is_used(&s.local);
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            namespace = Some(s.local.name.to_string());
                            namespace_used = is_used(&s.local);
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            let (imported, imported_is_string) = match &s.imported {
                                ModuleExportName::IdentifierName(id) => (id.name.to_string(), false),
                                ModuleExportName::IdentifierReference(id) => {
                                    (id.name.to_string(), false)
                                }
                                ModuleExportName::StringLiteral(sl) => (sl.value.to_string(), true),
                            };
                            named.push(NamedImport {
                                imported,
                                imported_is_string,
                                local: s.local.name.to_string(),
                                is_type: s.import_kind.is_type(),
                                used: is_used(&s.local),
                            });
                        }
                    }
                }
                // `import {} from 'x'` has braces but no specifiers
                namespace.is_none()
                    && (!named.is_empty() || has_brace_after_keyword(decl.span, text))
            }
            None => false,
        };

        decls.push(ImportDecl {
            statement_index,
            start: decl.span.start as usize,
            end: decl.span.end as usize,
            source: decl.source.value.to_string(),
            is_type: decl.import_kind.is_type(),
            default,
            default_used,
            namespace,
            namespace_used,
            named,
            has_braces,
            side_effect: decl.specifiers.is_none(),
            has_attributes: decl.with_clause.is_some() || decl.phase.is_some(),
        });
    }

    trace!("Found {} import declarations in {}", decls.len(), path.display());
    Ok(decls)
}

/// Bindings the semantic pass could not resolve count as used.
fn is_referenced(scoping: &Scoping, binding: &BindingIdentifier) -> bool {
    binding
        .symbol_id
        .get()
        .is_none_or(|symbol_id| !scoping.get_resolved_reference_ids(symbol_id).is_empty())
}

fn has_brace_after_keyword(span: oxc_span::Span, text: &str) -> bool {
    text[span.start as usize..span.end as usize].contains('{')
}

/// Source text of every top-level import declaration, in source order.
pub fn import_declarations(path: &Path, text: &str) -> Result<Vec<String>> {
    Ok(parse_imports(path, text)?.iter().map(|d| d.text(text).to_string()).collect())
}

fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    // Only modules can hold import declarations, so everything parses as one.
    SourceType::default()
        .with_module(true)
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx") | Some("js")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, text: &str) -> Vec<ImportDecl> {
        parse_imports(Path::new(name), text).unwrap()
    }

    #[test]
    fn test_default_and_named() {
        let decls = parse("a.js", "import foo, { bar, baz as qux } from './utils';");
        assert_eq!(decls.len(), 1);
        let d = &decls[0];
        assert_eq!(d.source, "./utils");
        assert_eq!(d.default.as_deref(), Some("foo"));
        assert!(d.has_braces);
        assert_eq!(d.named.len(), 2);
        assert_eq!(d.named[1].imported, "baz");
        assert_eq!(d.named[1].local, "qux");
        assert!(!d.side_effect);
    }

    #[test]
    fn test_namespace() {
        let decls = parse("a.js", "import * as utils from './utils';");
        assert_eq!(decls[0].namespace.as_deref(), Some("utils"));
        assert!(!decls[0].has_braces);
    }

    #[test]
    fn test_side_effect() {
        let decls = parse("a.js", "import './polyfills';");
        assert!(decls[0].side_effect);
        assert!(!decls[0].has_braces);
    }

    #[test]
    fn test_empty_braces() {
        let decls = parse("a.js", "import {} from './x';");
        assert!(decls[0].has_braces);
        assert!(decls[0].named.is_empty());
        assert!(!decls[0].side_effect);
    }

    #[test]
    fn test_type_imports() {
        let decls = parse(
            "a.ts",
            "import type { Foo } from './types';\nimport { type Bar, baz } from './b';",
        );
        assert!(decls[0].is_type);
        assert!(!decls[1].is_type);
        assert!(decls[1].named[0].is_type);
        assert!(!decls[1].named[1].is_type);
    }

    #[test]
    fn test_import_attributes() {
        let decls = parse("a.js", "import data from './data.json' with { type: 'json' };");
        assert!(decls[0].has_attributes);
    }

    #[test]
    fn test_statement_indices() {
        let decls = parse("a.js", "import a from 'a';\nconst x = 1;\nimport b from 'b';");
        assert_eq!(decls[0].statement_index, 0);
        assert_eq!(decls[1].statement_index, 2);
    }

    #[test]
    fn test_import_declarations_text() {
        let text = "import {b} from \"./b\"; import {a} from \"./a\";\nfoo();";
        let decls = import_declarations(Path::new("a.js"), text).unwrap();
        assert_eq!(decls, vec!["import {b} from \"./b\";", "import {a} from \"./a\";"]);
    }

    #[test]
    fn test_jsx_in_js_file() {
        let decls = parse("a.js", "import React from 'react';\nconst el = <div />;");
        assert_eq!(decls.len(), 1);
    }

    #[test]
    fn test_binding_usage() {
        let decls = parse(
            "a.ts",
            "import D, { a, b as c, type T } from './x';\nimport * as ns from './y';\nconst v: T = a;\n",
        );
        assert!(!decls[0].default_used);
        assert_eq!(decls[0].named.iter().map(|n| n.used).collect::<Vec<_>>(), vec![true, false, true]);
        assert!(!decls[1].namespace_used);
        assert!(decls[1].is_unused());
        assert!(!decls[0].is_unused());
    }

    #[test]
    fn test_react_counts_as_used_by_jsx() {
        let decls = parse("a.jsx", "import React from 'react';\nexport const el = <div />;");
        assert!(decls[0].default_used);
        let decls = parse("b.jsx", "import React from 'react';\nexport const x = 1;");
        assert!(!decls[0].default_used);
    }

    #[test]
    fn test_bindingless_imports_are_never_unused() {
        let decls = parse("a.js", "import './polyfill';\nimport {} from './x';");
        assert!(!decls[0].is_unused());
        assert!(!decls[1].is_unused());
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        assert!(parse_imports(Path::new("a.ts"), "import { from './x';").is_err());
    }
}
