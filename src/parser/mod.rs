//! Markdown parsing: line classification into blocks and inline span resolution.

mod block;
mod inline;
mod options;

pub use block::{parse, BlockParser};
pub use inline::{format_inline, strip_markup, try_format_inline};
pub use options::{ListNesting, ParseOptions};
