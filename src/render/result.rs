//! Rendering result with statistics and recovered faults.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Block, BlockKind};
use serde::{Deserialize, Serialize};

/// Result of rendering a document: the artifact plus what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The finished artifact (PDF bytes or display-list JSON)
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Rendering statistics
    pub stats: RenderStats,

    /// Blocks that were drawn with the fallback renderer or skipped
    pub faults: Vec<BlockFault>,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(bytes: Vec<u8>, stats: RenderStats, faults: Vec<BlockFault>) -> Self {
        Self {
            bytes,
            stats,
            faults,
        }
    }

    /// Get the artifact length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the artifact is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check if any block needed recovery.
    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }

    /// Write the artifact to a file. Refuses to write an empty artifact.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(Error::EmptyArtifact);
        }
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// A block that could not be drawn normally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFault {
    /// Index of the block in the document
    pub index: usize,

    /// Kind of the block
    pub kind: BlockKind,

    /// Description of the fault
    pub message: String,

    /// Whether the fallback renderer drew the block
    pub recovered: bool,
}

/// Statistics collected during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of pages produced
    pub page_count: u32,

    /// Number of blocks laid out
    pub block_count: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of paragraph lines
    pub paragraph_count: u32,

    /// Number of bullet and numbered items
    pub list_item_count: u32,

    /// Number of blockquote lines
    pub quote_count: u32,

    /// Number of code blocks
    pub code_block_count: u32,

    /// Number of code lines drawn, after wrapping
    pub code_line_count: u32,

    /// Number of blocks drawn with the fallback renderer
    pub fallback_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a block by kind.
    pub fn add_block(&mut self, block: &Block) {
        self.block_count += 1;
        match block.kind() {
            BlockKind::Heading => self.heading_count += 1,
            BlockKind::Paragraph => self.paragraph_count += 1,
            BlockKind::BulletItem | BlockKind::NumberedItem => self.list_item_count += 1,
            BlockKind::Blockquote => self.quote_count += 1,
            BlockKind::CodeBlock => self.code_block_count += 1,
            BlockKind::BlankSeparator => {}
        }
    }

    /// Add drawn code lines.
    pub fn add_code_lines(&mut self, count: usize) {
        self.code_line_count += count as u32;
    }

    /// Increment fallback count.
    pub fn add_fallback(&mut self) {
        self.fallback_count += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.page_count += other.page_count;
        self.block_count += other.block_count;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.quote_count += other.quote_count;
        self.code_block_count += other.code_block_count;
        self.code_line_count += other.code_line_count;
        self.fallback_count += other.fallback_count;
    }
}
