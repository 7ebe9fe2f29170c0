//! Myers' diff over sequences of lines
//!
//! Produces the shortest edit script turning `a` into `b`, then groups it into
//! hunks with a few lines of unchanged context around each change.

use derive_new::new;
use std::fmt::Display;

/// Unchanged lines kept around each change in a hunk
pub const HUNK_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { value: T },
    Insert { value: T },
    Equal { value: T },
}

impl<T> Edit<T> {
    pub fn value(&self) -> &T {
        match self {
            Edit::Delete { value } | Edit::Insert { value } | Edit::Equal { value } => value,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }
}

impl<T: Display> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Delete { value } => write!(f, "-{value}"),
            Edit::Insert { value } => write!(f, "+{value}"),
            Edit::Equal { value } => write!(f, " {value}"),
        }
    }
}

pub trait DiffAlgorithm<'d, T> {
    type Trace;
    type EditPath;
    type EditScript;

    fn compute_shortest_edit(&self) -> Self::Trace;
    fn backtrack(&self) -> Self::EditPath;
    fn diff(&self) -> Self::EditScript;
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> DiffAlgorithm<'d, T> for MyersDiff<'d, T> {
    type Trace = Vec<Vec<isize>>;
    type EditPath = Vec<(isize, isize, isize, isize)>;
    type EditScript = Vec<Edit<T>>;

    fn compute_shortest_edit(&self) -> Self::Trace {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (n + m) as usize;

        let mut v = vec![0; 2 * offset + 1];
        let mut trace = Vec::new();

        for d in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let idx = (offset as isize + k) as usize;

                let mut x = if k == -d {
                    // only reachable from k+1, an insertion
                    v[idx + 1]
                } else if k == d {
                    // only reachable from k-1, a deletion
                    v[idx - 1] + 1
                } else {
                    let x_del = v[idx - 1] + 1;
                    let x_ins = v[idx + 1];
                    if x_del > x_ins { x_del } else { x_ins }
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    fn backtrack(&self) -> Self::EditPath {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (x + y) as usize;
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit();

        for (d, v) in trace.iter().enumerate().rev() {
            let k = x - y;

            let prev_k = if k == -(d as isize) {
                k + 1
            } else if k == (d as isize) {
                k - 1
            } else {
                let k_del = k - 1;
                let k_ins = k + 1;
                if v[(offset as isize + k_del) as usize] + 1 > v[(offset as isize + k_ins) as usize]
                {
                    k_del
                } else {
                    k_ins
                }
            };

            let prev_x = v[(offset as isize + prev_k) as usize];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                edit_path.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        edit_path
    }

    fn diff(&self) -> Self::EditScript {
        let mut diff = Vec::new();
        if self.a.is_empty() && self.b.is_empty() {
            return diff;
        }

        for (prev_x, prev_y, x, y) in self.backtrack() {
            if x == prev_x {
                if prev_y < self.b.len() as isize {
                    diff.push(Edit::Insert {
                        value: self.b[prev_y as usize].clone(),
                    });
                }
            } else if y == prev_y {
                if prev_x < self.a.len() as isize {
                    diff.push(Edit::Delete {
                        value: self.a[prev_x as usize].clone(),
                    });
                }
            } else if prev_x < self.a.len() as isize {
                diff.push(Edit::Equal {
                    value: self.a[prev_x as usize].clone(),
                });
            }
        }

        diff.reverse();
        diff
    }
}

impl<'d, T: Eq + Clone> MyersDiff<'d, T> {
    /// The edit script split into hunks of changes plus `context` lines
    pub fn hunks(&self, context: usize) -> Vec<Hunk<T>> {
        Hunk::build(self.diff(), context)
    }
}

/// A run of edits with 1-based starting lines on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<T> {
    a_start: usize,
    b_start: usize,
    edits: Vec<Edit<T>>,
}

impl<T: Clone> Hunk<T> {
    fn build(edits: Vec<Edit<T>>, context: usize) -> Vec<Self> {
        // line offsets on both sides before each edit
        let mut offsets = Vec::with_capacity(edits.len());
        let (mut a_line, mut b_line) = (0, 0);
        for edit in &edits {
            offsets.push((a_line, b_line));
            match edit {
                Edit::Delete { .. } => a_line += 1,
                Edit::Insert { .. } => b_line += 1,
                Edit::Equal { .. } => {
                    a_line += 1;
                    b_line += 1;
                }
            }
        }

        let changes = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| !edit.is_equal())
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        let mut hunks = Vec::new();
        let mut next = 0;
        while next < changes.len() {
            let first = changes[next];
            let mut last = first;
            next += 1;

            // changes separated by at most 2 * context equal lines share a hunk
            while next < changes.len() && changes[next] - last - 1 <= 2 * context {
                last = changes[next];
                next += 1;
            }

            let start = first.saturating_sub(context);
            let end = (last + context).min(edits.len() - 1);
            let (a_offset, b_offset) = offsets[start];

            hunks.push(Hunk {
                a_start: a_offset + 1,
                b_start: b_offset + 1,
                edits: edits[start..=end].to_vec(),
            });
        }

        hunks
    }
}

impl<T> Hunk<T> {
    pub fn a_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| !matches!(edit, Edit::Insert { .. }))
            .count()
    }

    pub fn b_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| !matches!(edit, Edit::Delete { .. }))
            .count()
    }

    /// Start line as shown in a header; an empty side points at the line before
    pub fn a_start(&self) -> usize {
        if self.a_size() == 0 {
            self.a_start - 1
        } else {
            self.a_start
        }
    }

    pub fn b_start(&self) -> usize {
        if self.b_size() == 0 {
            self.b_start - 1
        } else {
            self.b_start
        }
    }

    pub fn edits(&self) -> &[Edit<T>] {
        &self.edits
    }

    /// `@@ -a_start,a_size +b_start,b_size @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.a_start(),
            self.a_size(),
            self.b_start(),
            self.b_size()
        )
    }
}
