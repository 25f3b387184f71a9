//! The Diff Presenter (§4.5): renders one commit's change to one file as
//! an interleaved sequence of context/removed/added lines, carrying blame
//! attribution on removed lines and future attribution on added lines,
//! with long unchanged runs collapsed.

use crate::blame::{self, BlameResult};
use crate::catblob::CatBlob;
use crate::config::Config;
use crate::error::Result;
use crate::model::{CommitHash, GitHistory};
use bstr::{BString, ByteSlice};

/// One rendered line of a presented diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// An unchanged line, present in both file versions.
    Context {
        content: Vec<u8>,
        old_line: u32,
        new_line: u32,
    },
    /// A line only in the old version, attributed to the commit that
    /// introduced it (or `None` if it predates the indexed history).
    Removed {
        content: Vec<u8>,
        blame: Option<CommitHash>,
    },
    /// A line only in the new version, attributed to the commit that will
    /// next touch it (or `None` if it survives to the tip of history).
    Added {
        content: Vec<u8>,
        future: Option<CommitHash>,
    },
    /// A run of collapsed context lines, replaced by this marker.
    Elision { skipped: u32 },
}

fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes.lines().collect()
}

struct Cursors {
    old: usize,
    new: usize,
}

/// Renders the diff for the commit that produced `r_new`, given the raw
/// bytes of the file at that commit and at its predecessor.
///
/// `r_old` is `None` exactly when `r_new.previous_commit_hash` is `None`
/// (the file did not exist before this commit); `old_bytes` is then
/// ignored and treated as empty.
pub fn render(
    r_old: Option<&BlameResult>,
    r_new: &BlameResult,
    old_bytes: &[u8],
    new_bytes: &[u8],
    config: &Config,
) -> Vec<DiffLine> {
    scopetime::scope_time!("diff::render");

    let old_lines = if r_old.is_some() {
        split_lines(old_bytes)
    } else {
        Vec::new()
    };
    let new_lines = split_lines(new_bytes);

    let mut out = Vec::new();
    let mut cursors = Cursors { old: 0, new: 0 };

    for hunk in &r_new.hunks {
        let distance = if hunk.old_length > 0 {
            (hunk.old_start as usize).saturating_sub(cursors.old + 1)
        } else {
            (hunk.new_start as usize).saturating_sub(cursors.new + 1)
        };
        emit_context(&mut out, &old_lines, &mut cursors, distance, config);

        for _ in 0..hunk.old_length {
            let blame = r_old
                .and_then(|r| r.blame_vector.get(cursors.old))
                .and_then(|(hash, _)| hash.clone());
            out.push(DiffLine::Removed {
                content: old_lines.get(cursors.old).copied().unwrap_or_default().to_vec(),
                blame,
            });
            cursors.old += 1;
        }

        for _ in 0..hunk.new_length {
            let future = r_new
                .future_vector
                .get(cursors.new)
                .and_then(|(hash, _)| hash.clone());
            out.push(DiffLine::Added {
                content: new_lines.get(cursors.new).copied().unwrap_or_default().to_vec(),
                future,
            });
            cursors.new += 1;
        }
    }

    let remaining = old_lines.len().saturating_sub(cursors.old);
    emit_context(&mut out, &old_lines, &mut cursors, remaining, config);

    out
}

/// Runs the full Diff Presenter pipeline (§4.5) for the commit that
/// produced the change to `path`: runs the Blame Engine at `commit` and,
/// if one exists, at its predecessor (steps 1-2), fetches both file
/// versions through `cat_blob`, then renders the interleaved diff (steps
/// 3-4 via [`render`]).
pub fn present(
    history: &GitHistory,
    commit: &CommitHash,
    path: &BString,
    cat_blob: &dyn CatBlob,
    config: &Config,
) -> Result<Vec<DiffLine>> {
    scopetime::scope_time!("diff::present");

    let r_new = blame::diff_blame(history, commit, path, config)?;
    let new_bytes = cat_blob.cat_blob(commit, path)?;

    let r_old = match &r_new.previous_commit_hash {
        Some(prev) => Some(blame::diff_blame(history, prev, path, config)?),
        None => None,
    };
    let old_bytes = match &r_new.previous_commit_hash {
        Some(prev) => cat_blob.cat_blob(prev, path)?,
        None => Vec::new(),
    };

    Ok(render(r_old.as_ref(), &r_new, &old_bytes, &new_bytes, config))
}

fn emit_context(
    out: &mut Vec<DiffLine>,
    old_lines: &[&[u8]],
    cursors: &mut Cursors,
    distance: usize,
    config: &Config,
) {
    if distance == 0 {
        return;
    }

    let threshold = config.context_collapse_threshold as usize;
    let edge = config.context_edge_lines as usize;

    if distance <= threshold {
        for _ in 0..distance {
            push_context_line(out, old_lines, cursors);
        }
        return;
    }

    for _ in 0..edge {
        push_context_line(out, old_lines, cursors);
    }
    let skipped = distance - 2 * edge;
    cursors.old += skipped;
    cursors.new += skipped;
    out.push(DiffLine::Elision {
        skipped: skipped as u32,
    });
    for _ in 0..edge {
        push_context_line(out, old_lines, cursors);
    }
}

fn push_context_line(out: &mut Vec<DiffLine>, old_lines: &[&[u8]], cursors: &mut Cursors) {
    out.push(DiffLine::Context {
        content: old_lines.get(cursors.old).copied().unwrap_or_default().to_vec(),
        old_line: (cursors.old + 1) as u32,
        new_line: (cursors.new + 1) as u32,
    });
    cursors.old += 1;
    cursors.new += 1;
}
