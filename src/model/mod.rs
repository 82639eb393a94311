//! Document model types for Markdown report content.
//!
//! This module defines the intermediate representation that bridges the
//! line parser and the layout engine: a flat sequence of [`Block`]s, each
//! carrying raw text whose inline formatting is resolved into
//! [`InlineSegment`]s at layout time.

mod block;
mod document;
mod geometry;
mod inline;

pub use block::{Block, BlockKind};
pub use document::{Document, DEFAULT_TITLE};
pub use geometry::{PageGeometry, Point, Rect};
pub use inline::{shorten_url, visible_text, InlineSegment};
