//! The read-only, in-memory data model described by the history index:
//! commits, per-file hunks, and the blame segments the Stepper produces.

use bstr::BString;
use std::collections::HashMap;
use std::fmt;

/// A commit hash truncated to the index's configured hex-prefix length.
///
/// Truncation trades a small, accepted collision risk (see
/// [`crate::config::Config::hash_prefix_len`]) for a compact key that's
/// cheap to hash and compare throughout the index.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct CommitHash(String);

impl CommitHash {
    /// Wraps an already-truncated hash string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Truncates `hash` to `prefix_len` hex characters.
    pub fn truncate(hash: &str, prefix_len: usize) -> Self {
        Self(hash.chars().take(prefix_len).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the sentinel used by [`super::blame::BlameResult`] when
    /// there is no previous/next commit to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitHash {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A single change region in a file's unified diff.
///
/// Line numbers are 1-based. A pure insertion has `old_length == 0`; a pure
/// deletion has `new_length == 0`. At least one of the two lengths is
/// always positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct Hunk {
    pub old_start: u32,
    pub old_length: u32,
    pub new_start: u32,
    pub new_length: u32,
}

impl Hunk {
    /// Swaps the old and new sides, turning a forward diff into the
    /// backward diff of the same file transition. Used by the Blame
    /// Engine's reverse pass (see [`crate::blame`]).
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            old_start: self.new_start,
            old_length: self.new_length,
            new_start: self.old_start,
            new_length: self.old_length,
        }
    }
}

/// One file's change within one commit: the hunks touching that path,
/// ordered by ascending `new_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    pub commit_hash: CommitHash,
    pub hunks: Vec<Hunk>,
}

/// A commit, and the files it touched.
///
/// `files` preserves the order paths were encountered while parsing; the
/// condensed log format does not guarantee any particular ordering of
/// files within a commit.
#[derive(Debug, Clone, Default)]
pub struct Commit {
    pub hash: CommitHash,
    pub files: Vec<(BString, Vec<Hunk>)>,
}

impl Commit {
    #[must_use]
    pub fn paths(&self) -> Vec<&BString> {
        self.files.iter().map(|(path, _)| path).collect()
    }
}

/// The chronological sequence of [`FileCommit`]s for one path.
#[derive(Debug, Clone, Default)]
pub struct FileHistory {
    pub commits: Vec<FileCommit>,
}

impl FileHistory {
    /// Index of `hash` within this file's history, if it touched the file.
    #[must_use]
    pub fn position(&self, hash: &CommitHash) -> Option<usize> {
        self.commits.iter().position(|fc| &fc.commit_hash == hash)
    }
}

/// A run of consecutive lines attributed to one commit.
///
/// `line_start` is the 1-based line number, in the file version this
/// segment belongs to, where the run begins. `commit_hash` is `None` for
/// the boundary sentinel: "predates the history" in a forward blame vector,
/// or "still exists past tip" in a future vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameSegment {
    pub line_count: u32,
    pub line_start: u32,
    pub commit_hash: Option<CommitHash>,
}

impl BlameSegment {
    #[must_use]
    pub const fn boundary(line_count: u32, line_start: u32) -> Self {
        Self {
            line_count,
            line_start,
            commit_hash: None,
        }
    }
}

/// An ordered, contiguous run of [`BlameSegment`]s covering an entire file.
pub type BlameSegments = Vec<BlameSegment>;

/// The per-line flattening of [`BlameSegments`]: one `(commit_hash,
/// line_start)` pair per line of the file.
pub type BlameVector = Vec<(Option<CommitHash>, u32)>;

/// Flattens [`BlameSegments`] into a per-line [`BlameVector`].
#[must_use]
pub fn flatten(segments: &[BlameSegment]) -> BlameVector {
    let total: usize =
        segments.iter().map(|s| s.line_count as usize).sum();
    let mut out = Vec::with_capacity(total);
    for segment in segments {
        for offset in 0..segment.line_count {
            out.push((
                segment.commit_hash.clone(),
                segment.line_start + offset,
            ));
        }
    }
    out
}

/// The total number of lines covered by `segments`.
#[must_use]
pub fn segments_line_count(segments: &[BlameSegment]) -> u32 {
    segments.iter().map(|s| s.line_count).sum()
}

/// The top-level in-memory index: every commit, and every file's history.
#[derive(Debug, Default)]
pub struct GitHistory {
    /// All commit hashes in log order. Duplicate-free.
    pub hashes: Vec<CommitHash>,
    /// Commit records, keyed by hash.
    pub commits: HashMap<CommitHash, Commit>,
    /// Per-file chronological histories, keyed by path.
    pub files: HashMap<BString, FileHistory>,
}

impl GitHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered list of paths a commit touched, or `None` if the commit is
    /// unknown to this index.
    #[must_use]
    pub fn commit_files(&self, hash: &CommitHash) -> Option<Vec<&BString>> {
        self.commits.get(hash).map(Commit::paths)
    }

    /// `(previous, next)` commit hashes in global log order, relative to
    /// `hash`. Either side is `None` at the ends of history.
    #[must_use]
    pub fn navigation(
        &self,
        hash: &CommitHash,
    ) -> Option<(Option<&CommitHash>, Option<&CommitHash>)> {
        let idx = self.hashes.iter().position(|h| h == hash)?;
        Some((
            idx.checked_sub(1).map(|i| &self.hashes[i]),
            self.hashes.get(idx + 1),
        ))
    }
}
