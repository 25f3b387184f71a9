//! A [`CatBlob`] implementation backed by `git2`, for embedders that
//! don't already have their own blob-fetching collaborator. Gated behind
//! the `git2-adapter` feature since §6.2 treats the cat-blob oracle as
//! external to the engine proper.

use crate::catblob::CatBlob;
use crate::error::{Error, Result};
use crate::model::CommitHash;
use bstr::{BString, ByteSlice};
use git2::Repository;
use std::path::Path;

/// Resolves blobs from an on-disk repository checkout via `git2`.
pub struct Git2CatBlob {
    repo: Repository,
}

impl Git2CatBlob {
    /// Opens the repository at `path` (or a parent directory containing
    /// `.git`), matching `git2::Repository::discover`'s usual lookup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }
}

impl CatBlob for Git2CatBlob {
    fn cat_blob(&self, commit_hash: &CommitHash, path: &BString) -> Result<Vec<u8>> {
        scopetime::scope_time!("git2_adapter::cat_blob");

        let commit = self
            .repo
            .revparse_single(commit_hash.as_str())
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| {
                Error::UpstreamFailure(format!(
                    "resolving commit {commit_hash}: {e}"
                ))
            })?;
        let tree = commit.tree().map_err(|e| {
            Error::UpstreamFailure(format!("reading tree for {commit_hash}: {e}"))
        })?;

        let path_str = path.to_str().map_err(|_| {
            Error::UpstreamFailure(
                "git2 adapter requires UTF-8 paths".to_owned(),
            )
        })?;
        let entry = tree.get_path(Path::new(path_str)).map_err(|e| {
            Error::UpstreamFailure(format!("{path_str} not found at {commit_hash}: {e}"))
        })?;
        let object = entry.to_object(&self.repo).map_err(|e| {
            Error::UpstreamFailure(format!("resolving blob object: {e}"))
        })?;
        let blob = object.as_blob().ok_or_else(|| {
            Error::UpstreamFailure(format!("{path_str} is not a blob at {commit_hash}"))
        })?;

        Ok(blob.content().to_vec())
    }
}
