
/// Indentation used when a declaration has to be re-rendered over several lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndentUnit {
    Tab,
    TwoSpaces,
    FourSpaces,
}

impl IndentUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentUnit::Tab => "\t",
            IndentUnit::TwoSpaces => "  ",
            IndentUnit::FourSpaces => "    ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewLineKind {
    LineFeed,
    CarriageReturnLineFeed,
}

impl NewLineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::LineFeed => "\n",
            NewLineKind::CarriageReturnLineFeed => "\r\n",
        }
    }
}

/// Only single quotes are ever produced; kept as a type so settings stay explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    Single,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
        }
    }
}

/// Settings a workspace applies to any text it generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManipulationSettings {
    pub indent_unit: IndentUnit,
    pub new_line_kind: NewLineKind,
    pub quote_style: QuoteStyle,
}

impl Default for ManipulationSettings {
    fn default() -> Self {
        Self {
            indent_unit: IndentUnit::FourSpaces,
            new_line_kind: NewLineKind::LineFeed,
            quote_style: QuoteStyle::Single,
        }
    }
}

/// Style resolved for a single file from `.editorconfig`.
///
/// Equal preferences are what lets files without a tsconfig share an ad-hoc
/// workspace, so the whole value (including `auto_detect_line_ending`) is the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StylePreferences {
    pub indent_unit: IndentUnit,
    pub line_ending: NewLineKind,
    pub quote_style: QuoteStyle,
    pub auto_detect_line_ending: bool,
}

impl StylePreferences {
    pub fn manipulation_settings(&self) -> ManipulationSettings {
        ManipulationSettings {
            indent_unit: self.indent_unit,
            new_line_kind: self.line_ending,
            quote_style: self.quote_style,
        }
    }
}

impl Default for StylePreferences {
    fn default() -> Self {
        Self {
            indent_unit: IndentUnit::FourSpaces,
            line_ending: NewLineKind::LineFeed,
            quote_style: QuoteStyle::Single,
            auto_detect_line_ending: false,
        }
    }
}

/// Handle to a file loaded into a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(FileId),
    NotFound,
}
