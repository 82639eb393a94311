//! Block-level types.

use serde::{Deserialize, Serialize};

/// One structural unit of parsed Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `#` to `####` heading
    Heading {
        /// Heading level (1-4)
        level: u8,
        /// Heading text, inline markup untouched
        text: String,
    },

    /// `-`, `*` or `+` list item
    BulletItem {
        /// Nesting level (0 = top level)
        level: u8,
        /// Item text
        text: String,
    },

    /// `N.` list item
    NumberedItem {
        /// Nesting level (0 = top level)
        level: u8,
        /// Ordinal exactly as written (leading zeros kept)
        ordinal: String,
        /// Item text
        text: String,
    },

    /// `> ` quoted line
    Blockquote {
        /// Quoted text
        text: String,
    },

    /// Fenced code, one entry per source line
    CodeBlock {
        /// Raw code lines
        lines: Vec<String>,
    },

    /// Any other non-blank line
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// A blank line outside code
    BlankSeparator,
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 4),
            text: text.into(),
        }
    }

    /// Create a bullet item.
    pub fn bullet(level: u8, text: impl Into<String>) -> Self {
        Block::BulletItem {
            level,
            text: text.into(),
        }
    }

    /// Create a numbered item.
    pub fn numbered(level: u8, ordinal: impl Into<String>, text: impl Into<String>) -> Self {
        Block::NumberedItem {
            level,
            ordinal: ordinal.into(),
            text: text.into(),
        }
    }

    /// Create a blockquote line.
    pub fn quote(text: impl Into<String>) -> Self {
        Block::Blockquote { text: text.into() }
    }

    /// Create a code block.
    pub fn code<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::CodeBlock {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Get the kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { .. } => BlockKind::Heading,
            Block::BulletItem { .. } => BlockKind::BulletItem,
            Block::NumberedItem { .. } => BlockKind::NumberedItem,
            Block::Blockquote { .. } => BlockKind::Blockquote,
            Block::CodeBlock { .. } => BlockKind::CodeBlock,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::BlankSeparator => BlockKind::BlankSeparator,
        }
    }

    /// Get the single line of text carried by this block, if any.
    ///
    /// Code blocks return `None`; use their `lines` directly.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { text, .. }
            | Block::BulletItem { text, .. }
            | Block::NumberedItem { text, .. }
            | Block::Blockquote { text }
            | Block::Paragraph { text } => Some(text),
            Block::CodeBlock { .. } | Block::BlankSeparator => None,
        }
    }

    /// Get the raw text of the block, code lines joined by newlines.
    pub fn raw_text(&self) -> String {
        match self {
            Block::CodeBlock { lines } => lines.join("\n"),
            other => other.text().unwrap_or_default().to_string(),
        }
    }

    /// Check if this is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::BulletItem { .. } | Block::NumberedItem { .. })
    }

    /// Get the heading level, or `None` for non-headings.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }
}

/// Discriminant of [`Block`] without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Heading
    Heading,
    /// Bullet list item
    BulletItem,
    /// Numbered list item
    NumberedItem,
    /// Blockquote line
    Blockquote,
    /// Fenced code block
    CodeBlock,
    /// Paragraph line
    Paragraph,
    /// Blank separator
    BlankSeparator,
}
