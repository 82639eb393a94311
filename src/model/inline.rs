//! Inline segment types.

use serde::{Deserialize, Serialize};

/// URLs longer than this are shortened when displayed.
const URL_DISPLAY_LIMIT: usize = 30;

/// One inline-formatted fragment of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineSegment {
    /// Unformatted text
    Plain(String),
    /// `**bold**`
    Bold(String),
    /// `*italic*`
    Italic(String),
    /// `` `code` ``
    Code(String),
    /// `[text](url)`
    Link {
        /// Link text
        text: String,
        /// Target URL
        url: String,
    },
}

impl InlineSegment {
    /// Create a plain segment.
    pub fn plain(text: impl Into<String>) -> Self {
        InlineSegment::Plain(text.into())
    }

    /// Create a link segment.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        InlineSegment::Link {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Get the visible text of the segment (link URL excluded).
    pub fn text(&self) -> &str {
        match self {
            InlineSegment::Plain(t)
            | InlineSegment::Bold(t)
            | InlineSegment::Italic(t)
            | InlineSegment::Code(t) => t,
            InlineSegment::Link { text, .. } => text,
        }
    }

    /// Get the text as drawn: links are annotated with their URL.
    pub fn display_text(&self) -> String {
        match self {
            InlineSegment::Link { text, url } => format!("{} ({})", text, shorten_url(url)),
            other => other.text().to_string(),
        }
    }

    /// Check if this segment carries no formatting.
    pub fn is_plain(&self) -> bool {
        matches!(self, InlineSegment::Plain(_))
    }
}

/// Shorten a URL for display: 27 characters and an ellipsis.
pub fn shorten_url(url: &str) -> String {
    if url.chars().count() > URL_DISPLAY_LIMIT {
        let head: String = url.chars().take(URL_DISPLAY_LIMIT - 3).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}

/// Concatenate the visible text of a segment sequence.
pub fn visible_text(segments: &[InlineSegment]) -> String {
    segments.iter().map(InlineSegment::text).collect()
}
