//! mdreport CLI - Markdown report to PDF renderer

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdreport::batch::{render_files_with_progress, total_stats};
use mdreport::render::to_json;
use mdreport::{
    append_metadata_section, parse_markdown, render_markdown_as, sanitize, JsonFormat,
    OutputFormat, PageGeometry, RenderOptions, RenderResult,
};

#[derive(Parser)]
#[command(name = "mdreport")]
#[command(author = "mdreport contributors")]
#[command(version)]
#[command(about = "Render Markdown reports to paginated PDF", long_about = None)]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file
    Render {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (input name with the format's extension if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "pdf")]
        format: Format,

        /// Metadata entry appended as a final section (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Heading of the metadata section
        #[arg(long, default_value = mdreport::report::DEFAULT_METADATA_HEADING)]
        meta_heading: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show the parsed block stream as JSON
    Blocks {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the sanitized text of a Markdown file
    Sanitize {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render many Markdown files in parallel
    Batch {
        /// Input Markdown files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every rendering command.
#[derive(Args, Clone)]
struct RenderArgs {
    /// Document title (first level-1 heading if not specified)
    #[arg(long, env = "MDREPORT_TITLE")]
    title: Option<String>,

    /// Footer date as YYYY-MM-DD (today if not specified)
    #[arg(long, env = "MDREPORT_DATE")]
    date: Option<String>,

    /// Page width in millimetres
    #[arg(long, env = "MDREPORT_PAGE_WIDTH", default_value = "210")]
    page_width: f32,

    /// Page height in millimetres
    #[arg(long, env = "MDREPORT_PAGE_HEIGHT", default_value = "297")]
    page_height: f32,

    /// Top and bottom margin in millimetres
    #[arg(long, env = "MDREPORT_MARGIN", default_value = "15")]
    margin: f32,

    /// Skip text sanitization
    #[arg(long)]
    no_sanitize: bool,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,
}

impl RenderArgs {
    fn to_options(&self) -> Result<RenderOptions, Box<dyn std::error::Error>> {
        let date = match self.date.as_deref() {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| format!("Invalid date '{}': {}", s, e))?,
            None => chrono::Local::now().date_naive(),
        };

        let mut options = RenderOptions::new()
            .with_generated_on(date)
            .with_geometry(PageGeometry::new(
                self.page_width,
                self.page_height,
                self.margin,
            ))
            .with_sanitize(!self.no_sanitize)
            .with_compression(!self.no_compress);

        if let Some(ref title) = self.title {
            options = options.with_title(title.clone());
        }

        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Paginated PDF
    Pdf,
    /// JSON display list of drawing operations
    Ops,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Ops => OutputFormat::DisplayList,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            format,
            meta,
            meta_heading,
            render,
        }) => cmd_render(
            &input,
            output.as_deref(),
            format,
            &meta,
            &meta_heading,
            &render,
        ),
        Some(Commands::Blocks {
            input,
            output,
            compact,
            render,
        }) => cmd_blocks(&input, output.as_deref(), compact, &render),
        Some(Commands::Sanitize { input, output }) => cmd_sanitize(&input, output.as_deref()),
        Some(Commands::Batch {
            inputs,
            output,
            render,
        }) => cmd_batch(&inputs, &output, &render),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: render to PDF if input is provided
            if let Some(input) = cli.input {
                cmd_render(
                    &input,
                    cli.output.as_deref(),
                    Format::Pdf,
                    &[],
                    mdreport::report::DEFAULT_METADATA_HEADING,
                    &cli.render,
                )
            } else {
                println!("{}", "Usage: mdreport <FILE> [OUTPUT]".yellow());
                println!("       mdreport --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_meta(entries: &[String]) -> Result<Vec<(String, String)>, Box<dyn std::error::Error>> {
    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid metadata '{}': expected KEY=VALUE", entry))?;
        parsed.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(parsed)
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    meta: &[String],
    meta_heading: &str,
    args: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = OutputFormat::from(format);
    let options = args.to_options()?;

    let mut markdown = fs::read_to_string(input)?;
    let entries = parse_meta(meta)?;
    if !entries.is_empty() {
        markdown = append_metadata_section(&markdown, meta_heading, &entries);
    }

    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.with_extension(format.extension()));

    log::debug!("rendering {} to {}", input.display(), output.display());
    let result = render_markdown_as(&markdown, &options, format)?;
    result.write_to(&output)?;

    print_summary(&result);
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn print_summary(result: &RenderResult) {
    let stats = &result.stats;
    println!(
        "{}: {} page(s), {} block(s), {} code line(s), {} bytes",
        "Rendered".bold(),
        stats.page_count,
        stats.block_count,
        stats.code_line_count,
        result.len()
    );

    for fault in &result.faults {
        let status = if fault.recovered {
            "recovered".yellow()
        } else {
            "skipped".red()
        };
        println!(
            "  {} block {} ({:?}): {} [{}]",
            "!".yellow().bold(),
            fault.index,
            fault.kind,
            fault.message,
            status
        );
    }
}

fn cmd_blocks(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(input)?;
    let doc = parse_markdown(&markdown, &args.to_options()?)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_sanitize(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(input)?;
    let text = sanitize(&markdown);

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    args: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options()?;
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let outcomes = render_files_with_progress(inputs, output_dir, &options, |outcome| {
        pb.set_message(outcome.input.display().to_string());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    println!("\n{}", "Output files:".green().bold());
    for (i, outcome) in outcomes.iter().enumerate() {
        let branch = if i + 1 == outcomes.len() { "└─" } else { "├─" };
        match &outcome.result {
            Ok(stats) => println!(
                "  {} {} ({} page(s))",
                branch.dimmed(),
                outcome.output.display(),
                stats.page_count
            ),
            Err(e) => println!(
                "  {} {} {}",
                branch.dimmed(),
                outcome.output.display(),
                format!("failed: {}", e).red()
            ),
        }
    }

    let total = total_stats(&outcomes);
    println!(
        "\n{}: {} file(s), {} page(s), {} block(s), {} fallback(s)",
        "Total".bold(),
        outcomes.len() - failed,
        total.page_count,
        total.block_count,
        total.fallback_count
    );

    if failed > 0 {
        return Err(format!("{} of {} file(s) failed", failed, outcomes.len()).into());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mdreport".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown report to PDF renderer");
    println!();
    println!("Library: mdreport {}", mdreport::VERSION);
    println!("License: MIT");
}
