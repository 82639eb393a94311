//! One-call report builder and Markdown helpers used around the core.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::PageGeometry;
use crate::render::{OutputFormat, RenderOptions, RenderResult, RenderStats};

/// Heading of the appended metadata section.
pub const DEFAULT_METADATA_HEADING: &str = "Report Metadata";

/// Append a metadata section to a Markdown report.
///
/// The section is a level-2 heading followed by one `- **key:** value`
/// bullet per entry. It is plain Markdown; nothing downstream treats it
/// specially.
pub fn append_metadata_section<K, V>(markdown: &str, heading: &str, entries: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::with_capacity(markdown.len() + 32 * (entries.len() + 1));
    out.push_str(markdown.trim_end());
    out.push_str("\n\n## ");
    out.push_str(heading);
    out.push_str("\n\n");
    for (key, value) in entries {
        out.push_str(&format!("- **{}:** {}\n", key.as_ref(), value.as_ref()));
    }
    out
}

/// File name derived from a title: characters outside `[A-Za-z0-9_-]`
/// become `_`, and `.pdf` is appended.
pub fn suggested_file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "report.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

/// Builder for rendering a report in one call.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use mdreport::Report;
///
/// let result = Report::new()
///     .with_title("Quarterly Review")
///     .with_generated_on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
///     .with_metadata("Author", "Research team")
///     .render("# Findings\n\nAll **good**.")?;
/// std::fs::write("review.pdf", &result.bytes)?;
/// # Ok::<(), mdreport::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Report {
    options: RenderOptions,
    format: OutputFormat,
    metadata_heading: String,
    metadata: Vec<(String, String)>,
}

impl Report {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
            format: OutputFormat::Pdf,
            metadata_heading: DEFAULT_METADATA_HEADING.to_string(),
            metadata: Vec::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options = self.options.with_title(title);
        self
    }

    /// Set the generation date.
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.options = self.options.with_generated_on(date);
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.options = self.options.with_geometry(geometry);
        self
    }

    /// Replace all render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a metadata entry, appended as a section after the body.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Set the heading of the metadata section.
    pub fn with_metadata_heading(mut self, heading: impl Into<String>) -> Self {
        self.metadata_heading = heading.into();
        self
    }

    /// Get the render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Markdown as it will be rendered, metadata section included.
    pub fn markdown(&self, body: &str) -> String {
        if self.metadata.is_empty() {
            body.to_string()
        } else {
            append_metadata_section(body, &self.metadata_heading, &self.metadata)
        }
    }

    /// Render the report.
    pub fn render(&self, markdown: &str) -> Result<RenderResult> {
        crate::render_markdown_as(&self.markdown(markdown), &self.options, self.format)
    }

    /// Render the report and write it to a file.
    pub fn render_to_file(&self, markdown: &str, path: impl AsRef<Path>) -> Result<RenderStats> {
        let result = self.render(markdown)?;
        result.write_to(path)?;
        Ok(result.stats)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}
