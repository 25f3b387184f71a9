//! Error types for the blame/history engine.

use crate::model::CommitHash;
use bstr::BString;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a [`crate::GitHistory`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The condensed log stream was malformed at the lexical level: an
    /// unparseable header line, a truncated hunk block, or a hunk header
    /// appearing outside a file section.
    #[error("malformed log at byte {offset}: {message}")]
    Parse {
        /// Byte offset into the stream where the malformed record begins.
        offset: u64,
        /// Human-readable description of what was expected.
        message: String,
    },

    /// A commit's hunks could not be applied to the running blame state of
    /// a file — e.g. a hunk's `old_start`/`new_start` implies a negative
    /// distance from the current cursor. Detected while the History Index
    /// validates each file's history at build time.
    #[error("invalid hunk sequence for {path:?} at commit {commit}: {message}")]
    InvalidHistory {
        /// The file whose history failed to replay.
        path: BString,
        /// The commit whose hunks could not be applied.
        commit: CommitHash,
        /// What went wrong.
        message: String,
    },

    /// No [`crate::GitHistory`] is registered under the requested repo name.
    #[error("unknown repository: {0:?}")]
    UnknownRepo(String),

    /// The requested path is absent from the index.
    #[error("path not present in history: {0:?}")]
    UnknownPath(BString),

    /// The requested commit does not appear in the given path's history.
    #[error("commit {commit} does not touch {path:?}")]
    UnknownCommitForPath {
        /// The commit that was looked up.
        commit: CommitHash,
        /// The path whose history was searched.
        path: BString,
    },

    /// The requested commit does not appear in the repository's global
    /// log at all (as opposed to [`Error::UnknownCommitForPath`], which
    /// means the commit exists but never touched a specific path).
    #[error("unknown commit: {0:?}")]
    UnknownCommit(String),

    /// The cat-blob collaborator failed to produce file bytes.
    #[error("cat-blob lookup failed: {0}")]
    UpstreamFailure(String),

    /// I/O error reading the log stream or a blob.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error, only reachable via the optional `git2-adapter`
    /// feature's [`crate::git2_adapter::Git2CatBlob`].
    #[cfg(feature = "git2-adapter")]
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
