//! In-memory index and blame/future propagation engine for a condensed,
//! first-parent git log stream.
//!
//! Build a [`GitHistory`] with [`parser::parse`] and [`index::build`],
//! publish it into a [`Registry`], then serve [`file_blame`],
//! [`diff_blame`], [`commit_files`] and [`navigation`] queries against it.
//! This crate has no opinion on how the log stream is produced, how
//! histories are rebuilt on a schedule, or how results reach callers —
//! that belongs to the embedding application.

#![forbid(unsafe_code)]
#![deny(
    unused_imports,
    unused_must_use,
    dead_code,
    unstable_name_collisions,
    unused_assignments
)]
#![deny(clippy::all, clippy::perf)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod blame;
pub mod catblob;
pub mod config;
pub mod diff;
pub mod error;
#[cfg(feature = "git2-adapter")]
pub mod git2_adapter;
pub mod index;
pub mod model;
pub mod parser;
pub mod registry;
pub mod stepper;

pub use blame::BlameResult;
pub use catblob::CatBlob;
pub use config::Config;
pub use diff::DiffLine;
pub use error::{Error, Result};
pub use model::{CommitHash, GitHistory};
pub use registry::Registry;

use bstr::BString;

/// `file_blame(repo, commit_hash, path)` (§6.3): resolves `commit_hash`
/// (including the `"HEAD"` alias) against `repo`'s current index and
/// returns its blame/future vectors for `path`.
pub fn file_blame(
    registry: &Registry,
    repo: &str,
    commit_hash: &str,
    path: &BString,
    config: &Config,
) -> Result<BlameResult> {
    let history = registry.get(repo)?;
    let resolved =
        index::resolve_commit(&history, commit_hash, path, config.hash_prefix_len)?;
    blame::file_blame(&history, &resolved, path, config)
}

/// `diff_blame(repo, commit_hash, path)` (§6.3): same resolution as
/// [`file_blame`], used by the Diff Presenter.
pub fn diff_blame(
    registry: &Registry,
    repo: &str,
    commit_hash: &str,
    path: &BString,
    config: &Config,
) -> Result<BlameResult> {
    let history = registry.get(repo)?;
    let resolved =
        index::resolve_commit(&history, commit_hash, path, config.hash_prefix_len)?;
    blame::diff_blame(&history, &resolved, path, config)
}

/// `diff_present(repo, commit_hash, path)` (§4.5): the full Diff Presenter
/// pipeline — runs [`diff_blame`] at `commit_hash` and its predecessor,
/// fetches both file versions through `cat_blob`, and renders the
/// interleaved diff.
pub fn diff_present(
    registry: &Registry,
    repo: &str,
    commit_hash: &str,
    path: &BString,
    cat_blob: &dyn CatBlob,
    config: &Config,
) -> Result<Vec<DiffLine>> {
    let history = registry.get(repo)?;
    let resolved =
        index::resolve_commit(&history, commit_hash, path, config.hash_prefix_len)?;
    diff::present(&history, &resolved, path, cat_blob, config)
}

/// `commit_files(repo, commit_hash)` (§6.3): the ordered list of paths a
/// commit touched. Resolves the `"HEAD"` alias the same way as
/// [`file_blame`], against the global log (there is no path here to
/// narrow the resolution against).
pub fn commit_files(
    registry: &Registry,
    repo: &str,
    commit_hash: &str,
    config: &Config,
) -> Result<Vec<BString>> {
    let history = registry.get(repo)?;
    let hash = index::resolve_global_commit(&history, commit_hash, config.hash_prefix_len)?;
    history
        .commit_files(&hash)
        .map(|paths| paths.into_iter().cloned().collect())
        .ok_or(Error::UnknownCommit(hash.as_str().to_owned()))
}

/// `navigation(repo, commit_hash)` (§6.3): `(previous_in_global,
/// next_in_global)` from the repo's global commit order. Resolves the
/// `"HEAD"` alias the same way as [`commit_files`].
pub fn navigation(
    registry: &Registry,
    repo: &str,
    commit_hash: &str,
    config: &Config,
) -> Result<(Option<CommitHash>, Option<CommitHash>)> {
    let history = registry.get(repo)?;
    let hash = index::resolve_global_commit(&history, commit_hash, config.hash_prefix_len)?;
    history
        .navigation(&hash)
        .map(|(prev, next)| (prev.cloned(), next.cloned()))
        .ok_or(Error::UnknownCommit(hash.as_str().to_owned()))
}
