//! JSON dump of a parsed document.

use crate::error::{Error, Result};
use crate::model::{Block, Document, InlineSegment};
use crate::parser::format_inline;
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct BlockDump<'a> {
    #[serde(flatten)]
    block: &'a Block,
    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<Vec<InlineSegment>>,
}

#[derive(Serialize)]
struct DocumentDump<'a> {
    title: &'a str,
    generated_on: String,
    blocks: Vec<BlockDump<'a>>,
}

/// Convert a document to JSON, with the resolved inline segments of every
/// text block except headings and code.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let dump = DocumentDump {
        title: &doc.title,
        generated_on: doc.generated_on.format("%Y-%m-%d").to_string(),
        blocks: doc
            .blocks
            .iter()
            .map(|block| BlockDump {
                block,
                segments: match block {
                    Block::Paragraph { text }
                    | Block::BulletItem { text, .. }
                    | Block::NumberedItem { text, .. }
                    | Block::Blockquote { text } => Some(format_inline(text)),
                    _ => None,
                },
            })
            .collect(),
    };

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&dump),
        JsonFormat::Compact => serde_json::to_string(&dump),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}
