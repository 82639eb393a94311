//! Greedy word wrapping by character count.
//!
//! Whitespace at the start of continuation lines is dropped; leading
//! whitespace of the first line is kept so indented code stays indented.
//! Words longer than the width are broken.

use crate::model::InlineSegment;
use serde::{Deserialize, Serialize};

/// Formatting of one run of wrapped text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    Plain,
    Bold,
    Italic,
    Code,
    Link(String),
}

/// A maximal piece of one wrapped line sharing a single format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub kind: RunKind,
}

impl Run {
    fn new(text: impl Into<String>, kind: RunKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Wrap plain text to at most `width` characters per line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let cells: Vec<(char, usize)> = text.chars().map(|c| (c, 0)).collect();
    wrap_cells(&cells, width)
        .into_iter()
        .map(|line| line.into_iter().map(|(c, _)| c).collect())
        .collect()
}

/// Wrap formatted segments, keeping each character's format.
///
/// Links are wrapped as their display text, `text (url)`.
pub fn wrap_segments(segments: &[InlineSegment], width: usize) -> Vec<Vec<Run>> {
    let kinds: Vec<RunKind> = segments.iter().map(run_kind).collect();
    let cells: Vec<(char, usize)> = segments
        .iter()
        .enumerate()
        .flat_map(|(index, segment)| {
            segment
                .display_text()
                .chars()
                .map(move |c| (c, index))
                .collect::<Vec<_>>()
        })
        .collect();

    wrap_cells(&cells, width)
        .into_iter()
        .map(|line| group_runs(&line, &kinds))
        .collect()
}

fn run_kind(segment: &InlineSegment) -> RunKind {
    match segment {
        InlineSegment::Plain(_) => RunKind::Plain,
        InlineSegment::Bold(_) => RunKind::Bold,
        InlineSegment::Italic(_) => RunKind::Italic,
        InlineSegment::Code(_) => RunKind::Code,
        InlineSegment::Link { url, .. } => RunKind::Link(url.clone()),
    }
}

/// Merge consecutive characters from the same segment into runs.
fn group_runs(line: &[(char, usize)], kinds: &[RunKind]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut current: Option<usize> = None;

    for &(c, index) in line {
        match (current, runs.last_mut()) {
            (Some(open), Some(run)) if open == index => run.text.push(c),
            _ => {
                let kind = kinds.get(index).cloned().unwrap_or(RunKind::Plain);
                runs.push(Run::new(c.to_string(), kind));
                current = Some(index);
            }
        }
    }

    runs
}

/// Core greedy wrap over tagged characters.
fn wrap_cells<T: Copy>(cells: &[(char, T)], width: usize) -> Vec<Vec<(char, T)>> {
    let width = width.max(1);
    let mut lines: Vec<Vec<(char, T)>> = Vec::new();
    let mut current: Vec<(char, T)> = Vec::new();

    for token in tokens(cells) {
        let is_space = token[0].0.is_whitespace();

        if is_space {
            if current.is_empty() && !lines.is_empty() {
                continue;
            }
            if current.len() + token.len() > width {
                emit(&mut lines, &mut current);
                continue;
            }
            current.extend(token.iter().map(|&(_, tag)| (' ', tag)));
            continue;
        }

        let mut word = token;
        loop {
            let room = width - current.len();
            if word.len() <= room {
                current.extend_from_slice(word);
                break;
            }
            if has_content(&current) || room == 0 {
                emit(&mut lines, &mut current);
                continue;
            }
            let (head, rest) = word.split_at(room);
            current.extend_from_slice(head);
            emit(&mut lines, &mut current);
            word = rest;
        }
    }

    emit(&mut lines, &mut current);
    lines
}

fn has_content<T>(line: &[(char, T)]) -> bool {
    line.iter().any(|(c, _)| !c.is_whitespace())
}

fn emit<T: Copy>(lines: &mut Vec<Vec<(char, T)>>, current: &mut Vec<(char, T)>) {
    while current.last().is_some_and(|(c, _)| c.is_whitespace()) {
        current.pop();
    }
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
    current.clear();
}

/// Split into maximal runs of whitespace and non-whitespace.
fn tokens<T>(cells: &[(char, T)]) -> Vec<&[(char, T)]> {
    let mut result = Vec::new();
    let mut start = 0;
    for i in 1..=cells.len() {
        let boundary = i == cells.len()
            || cells[i].0.is_whitespace() != cells[start].0.is_whitespace();
        if boundary {
            result.push(&cells[start..i]);
            start = i;
        }
    }
    result
}
