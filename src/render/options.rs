//! Rendering options and configuration.

use chrono::NaiveDate;

use crate::model::{PageGeometry, DEFAULT_TITLE};
use crate::parser::ParseOptions;
use crate::sanitize::SanitizeOptions;

/// Options for rendering a Markdown report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Explicit title; otherwise the first level-1 heading is used
    pub title: Option<String>,

    /// Title used when no heading is found
    pub default_title: String,

    /// Date printed in the footer; never read from the clock
    pub generated_on: NaiveDate,

    /// Page geometry
    pub geometry: PageGeometry,

    /// Run the sanitizer over the text and title
    pub sanitize: bool,

    /// Sanitizer configuration
    pub sanitizer: SanitizeOptions,

    /// Compress PDF content streams
    pub compress: bool,

    /// Footer wording
    pub labels: FooterLabels,

    /// Block parser configuration
    pub parse: ParseOptions,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the fallback title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Set the generation date shown in the footer.
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Enable or disable sanitizing.
    pub fn with_sanitize(mut self, enabled: bool) -> Self {
        self.sanitize = enabled;
        self
    }

    /// Set sanitizer options.
    pub fn with_sanitizer(mut self, options: SanitizeOptions) -> Self {
        self.sanitizer = options;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Set footer labels.
    pub fn with_labels(mut self, labels: FooterLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Set parser options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: None,
            default_title: DEFAULT_TITLE.to_string(),
            generated_on: NaiveDate::default(),
            geometry: PageGeometry::a4(),
            sanitize: true,
            sanitizer: SanitizeOptions::default(),
            compress: true,
            labels: FooterLabels::default(),
            parse: ParseOptions::default(),
        }
    }
}

/// Wording of the page footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLabels {
    /// Prefix of the page number, e.g. "Page"
    pub page: String,

    /// Prefix of the date line, e.g. "Generated on"
    pub generated: String,

    /// chrono format string for the date
    pub date_format: String,
}

impl FooterLabels {
    /// Create labels.
    pub fn new(page: impl Into<String>, generated: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            generated: generated.into(),
            ..Self::default()
        }
    }

    /// Set the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}

impl Default for FooterLabels {
    fn default() -> Self {
        Self {
            page: "Page".to_string(),
            generated: "Generated on".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

/// Artifact produced by a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// PDF document
    #[default]
    Pdf,
    /// JSON list of draw operations
    DisplayList,
}

impl OutputFormat {
    /// Parse a format name ("pdf", "ops").
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "ops" | "display-list" | "json" => Ok(OutputFormat::DisplayList),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }

    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::DisplayList => "json",
        }
    }
}
