//! Parallel rendering of independent Markdown files.
//!
//! Every file gets its own document, cursor and writer, so files are
//! rendered on the rayon pool with no coordination.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::render::{RenderOptions, RenderStats};

/// Outcome of rendering one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Markdown input
    pub input: PathBuf,
    /// Artifact destination
    pub output: PathBuf,
    /// Statistics, or the error that stopped this file
    pub result: Result<RenderStats>,
}

impl BatchOutcome {
    /// Check if this file rendered.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Destination for `input` inside `output_dir`: same stem, new extension.
pub fn output_path(input: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", file_stem(input), extension))
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}

/// Destinations for a batch, one per input in order.
///
/// Inputs from different directories can share a stem; later ones get a
/// numeric suffix (`report-2.pdf`, `report-3.pdf`) so no two files write
/// to the same path. Names are compared case-insensitively.
pub fn output_paths<P: AsRef<Path>>(
    inputs: &[P],
    output_dir: &Path,
    extension: &str,
) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let input = input.as_ref();
            let mut path = output_path(input, output_dir, extension);
            let mut suffix = 1;
            while !taken.insert(path_key(&path)) {
                suffix += 1;
                path = output_dir.join(format!("{}-{}.{}", file_stem(input), suffix, extension));
            }
            if suffix > 1 {
                debug!("{} renamed to {} to avoid a name clash", input.display(), path.display());
            }
            path
        })
        .collect()
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Render every input to a PDF in `output_dir`, in parallel.
///
/// Results are returned in input order. A failing file does not stop
/// the others.
pub fn render_files<P>(
    inputs: &[P],
    output_dir: &Path,
    options: &RenderOptions,
) -> Vec<BatchOutcome>
where
    P: AsRef<Path> + Sync,
{
    render_files_with_progress(inputs, output_dir, options, |_| {})
}

/// Like [`render_files`], calling `on_done` as each file finishes.
pub fn render_files_with_progress<P, F>(
    inputs: &[P],
    output_dir: &Path,
    options: &RenderOptions,
    on_done: F,
) -> Vec<BatchOutcome>
where
    P: AsRef<Path> + Sync,
    F: Fn(&BatchOutcome) + Sync,
{
    let outputs = output_paths(inputs, output_dir, "pdf");

    inputs
        .par_iter()
        .zip(outputs)
        .map(|(input, output)| {
            let input = input.as_ref();
            let result = render_one(input, &output, options);

            match &result {
                Ok(stats) => debug!(
                    "{} -> {} ({} pages)",
                    input.display(),
                    output.display(),
                    stats.page_count
                ),
                Err(err) => warn!("{}: {}", input.display(), err),
            }

            let outcome = BatchOutcome {
                input: input.to_path_buf(),
                output,
                result,
            };
            on_done(&outcome);
            outcome
        })
        .collect()
}

/// Combined statistics of the files that rendered.
pub fn total_stats(outcomes: &[BatchOutcome]) -> RenderStats {
    let mut total = RenderStats::new();
    for stats in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        total.merge(stats);
    }
    total
}

fn render_one(input: &Path, output: &Path, options: &RenderOptions) -> Result<RenderStats> {
    let markdown = std::fs::read_to_string(input)?;
    crate::render_to_file(&markdown, output, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/in/notes.md"), Path::new("/out"), "pdf");
        assert_eq!(path, PathBuf::from("/out/notes.pdf"));
    }

    #[test]
    fn test_output_paths_disambiguate_stems() {
        let inputs = ["a/report.md", "b/report.md", "c/Report.md", "notes.md"];
        let paths = output_paths(&inputs, Path::new("/out"), "pdf");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/out/report.pdf"),
                PathBuf::from("/out/report-2.pdf"),
                PathBuf::from("/out/Report-3.pdf"),
                PathBuf::from("/out/notes.pdf"),
            ]
        );
    }

    #[test]
    fn test_output_paths_skip_existing_suffix() {
        let inputs = ["report-2.md", "a/report.md", "b/report.md"];
        let paths = output_paths(&inputs, Path::new("/out"), "pdf");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/out/report-2.pdf"),
                PathBuf::from("/out/report.pdf"),
                PathBuf::from("/out/report-3.pdf"),
            ]
        );
    }

    #[test]
    fn test_same_stem_in_two_directories() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let a = dir.path().join("a").join("report.md");
        let b = dir.path().join("b").join("report.md");
        std::fs::write(&a, "# From A").unwrap();
        std::fs::write(&b, "# From B").unwrap();

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let options = RenderOptions::default().with_compression(false);
        let outcomes = render_files(&[a, b], &out, &options);

        assert!(outcomes.iter().all(BatchOutcome::is_ok));
        assert_eq!(outcomes[0].output, out.join("report.pdf"));
        assert_eq!(outcomes[1].output, out.join("report-2.pdf"));

        let first = std::fs::read(out.join("report.pdf")).unwrap();
        let second = std::fs::read(out.join("report-2.pdf")).unwrap();
        assert!(String::from_utf8_lossy(&first).contains("/Title (From A)"));
        assert!(String::from_utf8_lossy(&second).contains("/Title (From B)"));
    }

    #[test]
    fn test_render_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, "# A\n\ntext").unwrap();
        std::fs::write(&b, "- item\n  - nested").unwrap();
        let missing = dir.path().join("missing.md");

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let done = AtomicUsize::new(0);
        let outcomes = render_files_with_progress(
            &[a, b, missing],
            &out,
            &RenderOptions::default(),
            |_| {
                done.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        assert!(!outcomes[2].is_ok());
        assert!(out.join("a.pdf").exists());
        assert!(out.join("b.pdf").exists());
        assert!(!out.join("missing.pdf").exists());

        let total = total_stats(&outcomes);
        assert_eq!(total.page_count, 2);
        assert_eq!(total.heading_count, 1);
        assert_eq!(total.list_item_count, 2);
    }
}
