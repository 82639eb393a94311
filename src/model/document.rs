//! Document-level types.

use super::{visible_text, Block, PageGeometry};
use crate::error::Result;
use crate::parser::{format_inline, BlockParser};
use crate::render::RenderOptions;
use crate::sanitize::Sanitizer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Title used when neither the caller nor the text supplies one.
pub const DEFAULT_TITLE: &str = "Document";

/// A parsed report, ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Title drawn in every page header
    pub title: String,

    /// Date printed in every page footer
    pub generated_on: NaiveDate,

    /// Page geometry, fixed for the whole render
    pub geometry: PageGeometry,

    /// Parsed blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document.
    pub fn new(title: impl Into<String>, generated_on: NaiveDate, geometry: PageGeometry) -> Self {
        Self {
            title: title.into(),
            generated_on,
            geometry,
            blocks: Vec::new(),
        }
    }

    /// Sanitize and parse Markdown into a document.
    ///
    /// The title is the explicit option if set, otherwise the first level-1
    /// heading, otherwise the configured default.
    pub fn from_markdown(markdown: &str, options: &RenderOptions) -> Result<Self> {
        options.geometry.validate()?;

        let sanitizer = Sanitizer::new(options.sanitizer.clone());
        let text = if options.sanitize {
            sanitizer.process(markdown)
        } else {
            markdown.to_string()
        };

        let blocks = BlockParser::new(options.parse.clone()).parse(&text);

        let title = match options.title.as_deref() {
            Some(explicit) if options.sanitize => sanitizer.process(explicit),
            Some(explicit) => explicit.to_string(),
            None => first_heading(&blocks).unwrap_or_else(|| options.default_title.clone()),
        };

        Ok(Self {
            title,
            generated_on: options.generated_on,
            geometry: options.geometry,
            blocks,
        })
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .all(|b| matches!(b, Block::BlankSeparator))
    }
}

/// Visible text of the first level-1 heading.
fn first_heading(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|block| match block {
        Block::Heading { level: 1, text } => {
            let title = visible_text(&format_inline(text));
            let title = title.trim();
            (!title.is_empty()).then(|| title.to_string())
        }
        _ => None,
    })
}
