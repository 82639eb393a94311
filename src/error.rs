//! Error types for mdreport library.

use std::io;
use thiserror::Error;

/// Result type alias for mdreport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a render.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Page geometry cannot hold any content.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// The writer produced no bytes.
    #[error("Renderer produced an empty artifact")]
    EmptyArtifact,

    /// Error serializing a display list or block dump.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable rendering error (page decorations, device state).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<RenderFault> for Error {
    fn from(fault: RenderFault) -> Self {
        Error::Render(fault.to_string())
    }
}

/// Recoverable fault raised while drawing a single block.
///
/// The layout engine catches these per block and redraws the block with
/// the plain fallback renderer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderFault {
    /// The output encoding has no code for this character.
    #[error("character {ch:?} cannot be encoded for the output device")]
    Unencodable {
        /// Offending character
        ch: char,
    },

    /// A cell does not fit in the horizontal space left on the line.
    #[error("cell of width {width:.1} exceeds available width {available:.1}")]
    Overflow {
        /// Requested cell width
        width: f32,
        /// Width left between cursor and right edge
        available: f32,
    },

    /// Backend-specific drawing failure.
    #[error("device error: {0}")]
    Device(String),
}

/// Fault raised when inline spans cannot be resolved into segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InlineFault {
    /// Two spans claim the same bytes.
    #[error("span at {start}..{end} overlaps a previous span ending at {previous_end}")]
    Overlap {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// End of the span it collides with
        previous_end: usize,
    },

    /// A span points outside the line or inside a multi-byte character.
    #[error("span {start}..{end} is not on character boundaries of a {len}-byte line")]
    Boundary {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// Line length in bytes
        len: usize,
    },
}
