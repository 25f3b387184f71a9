//! The Stepper: maps `(prior segments, one commit's hunks)` to the next
//! segments. This is the algorithmic heart of the engine; the Blame Engine
//! is just this function run forward and backward over a file's history.

use crate::model::{BlameSegment, CommitHash, Hunk};

/// Walks a prior [`BlameSegment`] sequence, handing out runs of lines as
/// `forward`/`skip` consume them.
struct PriorCursor<'a> {
    segments: &'a [BlameSegment],
    idx: usize,
    /// Lines already consumed from `segments[idx]`.
    consumed: u32,
}

impl<'a> PriorCursor<'a> {
    fn new(segments: &'a [BlameSegment]) -> Self {
        Self {
            segments,
            idx: 0,
            consumed: 0,
        }
    }

    fn remaining_in_current(&self) -> u32 {
        self.segments
            .get(self.idx)
            .map_or(0, |s| s.line_count - self.consumed)
    }

    fn advance_segment(&mut self) {
        self.idx += 1;
        self.consumed = 0;
    }

    /// Copies `n` lines from the prior stream into `out`, preserving their
    /// attribution, splitting prior segments as needed. Returns `false` if
    /// the prior stream is exhausted before `n` lines could be produced.
    fn forward(&mut self, n: u32, out: &mut Vec<BlameSegment>) -> bool {
        let mut remaining = n;
        while remaining > 0 {
            let avail = self.remaining_in_current();
            if avail == 0 {
                if self.idx >= self.segments.len() {
                    return false;
                }
                self.advance_segment();
                continue;
            }
            let take = remaining.min(avail);
            let seg = &self.segments[self.idx];
            out.push(BlameSegment {
                line_count: take,
                line_start: seg.line_start + self.consumed,
                commit_hash: seg.commit_hash.clone(),
            });
            self.consumed += take;
            remaining -= take;
            if self.consumed >= seg.line_count {
                self.advance_segment();
            }
        }
        true
    }

    /// Advances past `n` lines without emitting anything.
    fn skip(&mut self, n: u32) -> bool {
        let mut remaining = n;
        while remaining > 0 {
            let avail = self.remaining_in_current();
            if avail == 0 {
                if self.idx >= self.segments.len() {
                    return false;
                }
                self.advance_segment();
                continue;
            }
            let take = remaining.min(avail);
            self.consumed += take;
            remaining -= take;
            if self.consumed >= self.segments[self.idx].line_count {
                self.advance_segment();
            }
        }
        true
    }

    /// Copies every remaining prior line into `out`.
    fn flush_remaining(&mut self, out: &mut Vec<BlameSegment>) {
        while self.idx < self.segments.len() {
            let seg = &self.segments[self.idx];
            let avail = seg.line_count - self.consumed;
            if avail > 0 {
                out.push(BlameSegment {
                    line_count: avail,
                    line_start: seg.line_start + self.consumed,
                    commit_hash: seg.commit_hash.clone(),
                });
            }
            self.advance_segment();
        }
    }
}

/// What went wrong while applying a commit's hunks to a file's prior
/// segments. The caller (the History Index at build time) attaches the
/// path and commit this failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// A hunk's `old_start`/`new_start` implied the cursor should move
    /// backward.
    NegativeDistance,
    /// A hunk referenced more old lines than the prior file contained.
    PriorExhausted,
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeDistance => {
                f.write_str("hunk start precedes current cursor position")
            }
            Self::PriorExhausted => f.write_str(
                "hunk referenced more lines than the prior file contains",
            ),
        }
    }
}

fn checked_distance(target: u32, cursor: u32) -> Result<u32, StepError> {
    target.checked_sub(cursor).ok_or(StepError::NegativeDistance)
}

/// Applies `hunks` (all belonging to one commit touching one file) to
/// `prior`, producing the file's segments immediately after that commit.
///
/// `hunks` must already be ordered by ascending `new_start`, as the
/// condensed log format guarantees.
pub fn step(
    prior: &[BlameSegment],
    commit_hash: &CommitHash,
    hunks: &[Hunk],
) -> Result<Vec<BlameSegment>, StepError> {
    let mut out = Vec::new();
    let mut cursor = PriorCursor::new(prior);
    let mut old_line_no: u32 = 1;
    let mut new_line_no: u32 = 1;

    for hunk in hunks {
        if hunk.old_length > 0 {
            let dist = checked_distance(hunk.old_start, old_line_no)?;
            if !cursor.forward(dist, &mut out) {
                return Err(StepError::PriorExhausted);
            }
            old_line_no += dist;
            new_line_no += dist;

            if !cursor.skip(hunk.old_length) {
                return Err(StepError::PriorExhausted);
            }
            old_line_no += hunk.old_length;
        }

        if hunk.new_length > 0 {
            let dist = checked_distance(hunk.new_start, new_line_no)?;
            if !cursor.forward(dist, &mut out) {
                return Err(StepError::PriorExhausted);
            }
            old_line_no += dist;
            new_line_no += dist;

            out.push(BlameSegment {
                line_count: hunk.new_length,
                line_start: new_line_no,
                commit_hash: Some(commit_hash.clone()),
            });
            new_line_no += hunk.new_length;
        }
    }

    cursor.flush_remaining(&mut out);

    Ok(out)
}
