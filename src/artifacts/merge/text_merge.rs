//! Three-way line merge
//!
//! Both sides are diffed against the base separately. Each diff is reduced to
//! a list of changed base regions, and the two lists are swept together in
//! base order:
//!
//! - a region only one side touched takes that side's lines
//! - a region both sides touched takes their lines if they agree, and a
//!   conflict block otherwise
//!
//! Regions that overlap or merely touch (one ends where the other starts) are
//! treated as the same region.

use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, Edit, MyersDiff};

pub const CONFLICT_START: &str = "<<<<<<<";
pub const CONFLICT_SEPARATOR: &str = "=======";
pub const CONFLICT_END: &str = ">>>>>>>";
pub const HEAD_LABEL: &str = "HEAD";

/// A replaced range of base lines, `base_start..base_end`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Change<'t> {
    base_start: usize,
    base_end: usize,
    lines: Vec<&'t str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Head,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedText {
    pub content: String,
    pub conflicts: usize,
}

impl MergedText {
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0
    }
}

/// Lines including their terminators, so joining them restores the text exactly
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn changes<'t>(base: &[&'t str], side: &[&'t str]) -> Vec<Change<'t>> {
    let mut changes: Vec<Change<'t>> = Vec::new();
    let mut base_line = 0;
    let mut open: Option<Change<'t>> = None;

    for edit in MyersDiff::new(base, side).diff() {
        match edit {
            Edit::Equal { .. } => {
                changes.extend(open.take());
                base_line += 1;
            }
            Edit::Delete { .. } => {
                let change = open.get_or_insert_with(|| Change {
                    base_start: base_line,
                    base_end: base_line,
                    lines: Vec::new(),
                });
                change.base_end += 1;
                base_line += 1;
            }
            Edit::Insert { value } => {
                open.get_or_insert_with(|| Change {
                    base_start: base_line,
                    base_end: base_line,
                    lines: Vec::new(),
                })
                .lines
                .push(value);
            }
        }
    }
    changes.extend(open);

    changes
}

/// Base lines `start..end` with the given changes applied
fn apply<'t>(base: &[&'t str], start: usize, end: usize, changes: &[&Change<'t>]) -> Vec<&'t str> {
    let mut lines = Vec::new();
    let mut at = start;

    for change in changes {
        lines.extend_from_slice(&base[at..change.base_start]);
        lines.extend_from_slice(&change.lines);
        at = change.base_end;
    }
    lines.extend_from_slice(&base[at..end]);

    lines
}

fn push_block(content: &mut String, lines: &[&str]) {
    for line in lines {
        content.push_str(line);
    }
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
}

/// Merge `head` and `other`, both derived from `base`
///
/// `other_label` ends the closing conflict marker, typically a branch name or
/// an oid.
pub fn merge_text(base: &str, head: &str, other: &str, other_label: &str) -> MergedText {
    let base_lines = split_lines(base);
    let head_lines = split_lines(head);
    let other_lines = split_lines(other);

    let mut pending = changes(&base_lines, &head_lines)
        .into_iter()
        .map(|change| (Side::Head, change))
        .chain(
            changes(&base_lines, &other_lines)
                .into_iter()
                .map(|change| (Side::Other, change)),
        )
        .collect::<Vec<_>>();
    pending.sort_by_key(|(side, change)| (change.base_start, change.base_end, *side as u8));

    let mut content = String::new();
    let mut conflicts = 0;
    let mut base_at = 0;
    let mut next = 0;

    while next < pending.len() {
        let region_start = pending[next].1.base_start;
        let mut region_end = pending[next].1.base_end;
        let mut region = vec![&pending[next]];
        next += 1;

        while next < pending.len() && pending[next].1.base_start <= region_end {
            region_end = region_end.max(pending[next].1.base_end);
            region.push(&pending[next]);
            next += 1;
        }

        for line in &base_lines[base_at..region_start] {
            content.push_str(line);
        }
        base_at = region_end;

        let side_changes = |wanted: Side| {
            region
                .iter()
                .filter(|(side, _)| *side == wanted)
                .map(|(_, change)| change)
                .collect::<Vec<_>>()
        };
        let (head_changes, other_changes) = (side_changes(Side::Head), side_changes(Side::Other));
        let head_text = apply(&base_lines, region_start, region_end, &head_changes);
        let other_text = apply(&base_lines, region_start, region_end, &other_changes);

        if head_changes.is_empty() {
            other_text.iter().for_each(|line| content.push_str(line));
        } else if other_changes.is_empty() || head_text == other_text {
            head_text.iter().for_each(|line| content.push_str(line));
        } else {
            conflicts += 1;
            push_block(&mut content, &[]);
            content.push_str(&format!("{CONFLICT_START} {HEAD_LABEL}\n"));
            push_block(&mut content, &head_text);
            content.push_str(&format!("{CONFLICT_SEPARATOR}\n"));
            push_block(&mut content, &other_text);
            content.push_str(&format!("{CONFLICT_END} {other_label}\n"));
        }
    }

    for line in &base_lines[base_at..] {
        content.push_str(line);
    }

    MergedText { content, conflicts }
}
