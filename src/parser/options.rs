//! Parsing options and configuration.

/// Default number of leading spaces per list nesting level.
pub const DEFAULT_INDENT_UNIT: usize = 2;

/// Deepest list level the parser reports.
pub const DEFAULT_MAX_LIST_LEVEL: u8 = 8;

/// Options for parsing Markdown text into blocks.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Keep blank lines inside fenced code instead of dropping them
    pub preserve_code_blank_lines: bool,

    /// How list nesting is inferred
    pub list_nesting: ListNesting,

    /// Leading spaces per nesting level
    pub indent_unit: usize,

    /// Nesting levels above this are clamped
    pub max_list_level: u8,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep blank lines inside fenced code blocks.
    pub fn preserve_code_blank_lines(mut self, preserve: bool) -> Self {
        self.preserve_code_blank_lines = preserve;
        self
    }

    /// Set the list nesting mode.
    pub fn with_list_nesting(mut self, nesting: ListNesting) -> Self {
        self.list_nesting = nesting;
        self
    }

    /// Render every list item at level 0.
    pub fn flat_lists(mut self) -> Self {
        self.list_nesting = ListNesting::Flat;
        self
    }

    /// Set the number of leading spaces per nesting level (minimum 1).
    pub fn with_indent_unit(mut self, spaces: usize) -> Self {
        self.indent_unit = spaces.max(1);
        self
    }

    /// Set the deepest reported nesting level.
    pub fn with_max_list_level(mut self, level: u8) -> Self {
        self.max_list_level = level;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_code_blank_lines: false,
            list_nesting: ListNesting::Indentation,
            indent_unit: DEFAULT_INDENT_UNIT,
            max_list_level: DEFAULT_MAX_LIST_LEVEL,
        }
    }
}

/// How list item nesting is inferred.
///
/// Nesting comes from the count of leading spaces only; no parent/child
/// relation between items is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListNesting {
    /// `leading_spaces / indent_unit`, level 0 when the indentation has tabs
    #[default]
    Indentation,
    /// Every item at level 0
    Flat,
}
