use anyhow::Result;
use organize_imports_core::{FileId, Workspace};

const SEPARATOR: char = '\t';

/// How a file is compared before and after organizing. Fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    /// Compare the complete file text
    FullText,
    /// Compare only the normalized text of the import declarations (list mode)
    ImportsOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    mode: ChangeMode,
    text: String,
}

impl Snapshot {
    pub fn capture<W: Workspace>(workspace: &W, id: FileId, mode: ChangeMode) -> Result<Self> {
        let text = match mode {
            ChangeMode::FullText => workspace.full_text(id).to_string(),
            ChangeMode::ImportsOnly => serialize_imports(&workspace.import_declarations(id)?),
        };
        Ok(Self { mode, text })
    }
}

pub fn did_change(before: &Snapshot, after: &Snapshot) -> bool {
    debug_assert_eq!(before.mode, after.mode, "snapshots taken in different modes");
    before.text != after.text
}

/// Serializes import declarations so that quote style and whitespace layout
/// do not count as differences while order and content do.
///
/// Quotes fold to `"`, whitespace runs collapse to a separator, a separator
/// between two word characters becomes a single space (matches do not
/// overlap, so in `a b c` only the first pair is joined), and every other
/// separator is dropped.
pub fn serialize_imports(declarations: &[String]) -> String {
    let joined = declarations.concat().replace('\'', "\"");

    let mut collapsed: Vec<char> = Vec::with_capacity(joined.len());
    let mut in_whitespace = false;
    for c in joined.chars() {
        if is_whitespace(c) {
            if !in_whitespace {
                collapsed.push(SEPARATOR);
            }
            in_whitespace = true;
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    let mut out = String::with_capacity(collapsed.len());
    let mut i = 0;
    while i < collapsed.len() {
        let c = collapsed[i];
        if is_word(c)
            && i + 2 < collapsed.len()
            && collapsed[i + 1] == SEPARATOR
            && is_word(collapsed[i + 2])
        {
            out.push(c);
            out.push(' ');
            out.push(collapsed[i + 2]);
            i += 3;
            continue;
        }
        if c != SEPARATOR {
            out.push(c);
        }
        i += 1;
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}
