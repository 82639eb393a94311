//! Rendering module: layout, pagination and output devices.

pub mod display_list;
mod json;
mod layout;
mod options;
mod page;
mod pdf;
mod renderer;
mod result;
mod style;
mod wrap;
mod writer;

pub use display_list::{DisplayListWriter, DrawOp};
pub use json::{to_json, JsonFormat};
pub use layout::{layout_block, layout_fallback, Drawn};
pub use options::{FooterLabels, OutputFormat, RenderOptions};
pub use page::{
    Advance, CellOptions, PageCursor, PageDecorator, PageRenderer, PageSurface,
    StandardDecorations, LEFT_MARGIN, RIGHT_MARGIN,
};
pub use pdf::PdfWriter;
pub use renderer::ReportRenderer;
pub use result::{BlockFault, RenderResult, RenderStats};
pub use style::{Align, Color, FontFamily, FontStyle, TextStyle, PT_TO_MM};
pub use wrap::{wrap_segments, wrap_text, Run, RunKind};
pub use writer::{DocumentInfo, PaginatedWriter, WriterMark};
