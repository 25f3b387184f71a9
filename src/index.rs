//! The History Index: organizes the Log Parser's commit stream into
//! per-file chronological histories and validates that every file's hunks
//! replay cleanly (§7's "malformed hunk math" check).

use crate::error::{Error, Result};
use crate::model::{BlameSegments, Commit, CommitHash, FileCommit, GitHistory};
use crate::stepper;
use bstr::BString;
use std::collections::HashMap;

/// Consumes the parser's commit stream and builds a [`GitHistory`].
///
/// Each file's hunks are replayed through the [`crate::stepper`] as they
/// are ingested, purely to catch malformed logs early (invariant 1 of the
/// spec this crate implements: every `FileCommit`, applied to the running
/// blame state, must produce a well-formed result). The replayed segments
/// themselves are discarded; the Blame Engine recomputes them per query.
pub fn build(commits: impl IntoIterator<Item = Commit>) -> Result<GitHistory> {
    scopetime::scope_time!("index::build");

    let mut history = GitHistory::new();
    let mut running: HashMap<BString, BlameSegments> = HashMap::new();

    for commit in commits {
        if history.commits.contains_key(&commit.hash) {
            // A repeated commit hash (collision at the configured prefix
            // length, or a duplicate record) — keep the first occurrence,
            // as `hashes` must stay duplicate-free.
            log::warn!(
                "dropping duplicate commit hash {} while building index",
                commit.hash
            );
            continue;
        }

        history.hashes.push(commit.hash.clone());

        for (path, hunks) in &commit.files {
            let prior = running.entry(path.clone()).or_default();
            let next = stepper::step(prior, &commit.hash, hunks).map_err(
                |e| Error::InvalidHistory {
                    path: path.clone(),
                    commit: commit.hash.clone(),
                    message: e.to_string(),
                },
            )?;
            *prior = next;

            history
                .files
                .entry(path.clone())
                .or_default()
                .commits
                .push(FileCommit {
                    commit_hash: commit.hash.clone(),
                    hunks: hunks.clone(),
                });
        }

        history.commits.insert(commit.hash.clone(), commit);
    }

    log::trace!(
        "index built: {} commits, {} files",
        history.hashes.len(),
        history.files.len()
    );

    Ok(history)
}

/// Resolves the `"HEAD"` alias (§6.3): `HEAD` maps to the last commit in
/// `path`'s history if `path` is known, otherwise to the last commit in the
/// global log. The engine never reports "not found" for `HEAD` while any
/// commits exist.
///
/// Any other `commit` string is truncated to `hash_prefix_len` and returned
/// as-is; whether it actually touched `path` is checked downstream by the
/// Blame Engine, which can give a more specific error
/// ([`Error::UnknownCommitForPath`]).
pub fn resolve_commit(
    history: &GitHistory,
    commit: &str,
    path: &BString,
    hash_prefix_len: usize,
) -> Result<CommitHash> {
    if commit != "HEAD" {
        return Ok(CommitHash::truncate(commit, hash_prefix_len));
    }

    if let Some(file_history) = history.files.get(path) {
        if let Some(fc) = file_history.commits.last() {
            return Ok(fc.commit_hash.clone());
        }
    }
    resolve_global_commit(history, commit, hash_prefix_len)
        .map_err(|_| Error::UnknownPath(path.clone()))
}

/// Resolves the `"HEAD"` alias against the global log only (§6.3), for
/// query entry points that have no path to narrow against
/// (`commit_files`, `navigation`). `HEAD` maps to the last entry in
/// `hashes`; any other `commit` string is truncated to `hash_prefix_len`
/// and returned as-is.
pub fn resolve_global_commit(
    history: &GitHistory,
    commit: &str,
    hash_prefix_len: usize,
) -> Result<CommitHash> {
    if commit != "HEAD" {
        return Ok(CommitHash::truncate(commit, hash_prefix_len));
    }
    history
        .hashes
        .last()
        .cloned()
        .ok_or_else(|| Error::UnknownCommit(commit.to_owned()))
}
