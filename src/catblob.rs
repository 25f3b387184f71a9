//! The external raw-bytes collaborator (§6.2). The Diff Presenter calls
//! this at most twice per request — once for the commit's file version,
//! once for its predecessor — and never touches it for plain blame
//! queries.

use crate::error::Result;
use crate::model::CommitHash;
use bstr::BString;

/// Fetches the raw bytes of `path` as it existed at `commit_hash`.
///
/// Implementations are free to hit a local object database, a repository
/// mirror, or any other store; this crate only defines the boundary.
/// Enable the `git2-adapter` feature for a ready-made implementation
/// backed by an on-disk checkout ([`crate::git2_adapter::Git2CatBlob`]).
pub trait CatBlob {
    fn cat_blob(&self, commit_hash: &CommitHash, path: &BString) -> Result<Vec<u8>>;
}
