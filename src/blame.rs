//! The Blame Engine: for a `(commit, path)` query, runs the Stepper
//! forward from a file's origin to produce the blame vector, and backward
//! from the file's terminal state to produce the future vector.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    flatten, segments_line_count, BlameSegment, BlameSegments, BlameVector,
    CommitHash, GitHistory, Hunk,
};
use crate::stepper;
use bstr::BString;

/// The result of a blame or diff-blame query: per-line attribution for one
/// file at one commit, plus enough context to navigate to its neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameResult {
    pub previous_commit_hash: Option<CommitHash>,
    pub next_commit_hash: Option<CommitHash>,
    pub blame_vector: BlameVector,
    pub future_vector: BlameVector,
    pub hunks: Vec<Hunk>,
}

/// Runs the Stepper forward over `commits`, starting from empty segments.
/// Panics only if the index was built from an unvalidated history — the
/// History Index's build step guarantees every file's hunks replay
/// cleanly, so a failure here indicates a bug in the index, not bad input.
fn replay_forward<'a>(
    commits: impl Iterator<Item = &'a crate::model::FileCommit>,
) -> BlameSegments {
    let mut segments = Vec::new();
    for fc in commits {
        segments = stepper::step(&segments, &fc.commit_hash, &fc.hunks)
            .expect(
                "GitHistory::build validates every file's hunks before publishing the index",
            );
    }
    segments
}

/// Replaces `segments` with a single synthetic "still exists" segment
/// (§4.4 step 4), or leaves it empty if the file has been deleted.
fn terminalize(segments: BlameSegments) -> BlameSegments {
    if segments.is_empty() {
        return segments;
    }
    let total = segments_line_count(&segments);
    vec![BlameSegment::boundary(total, 1)]
}

fn file_history_and_position<'a>(
    history: &'a GitHistory,
    commit: &CommitHash,
    path: &BString,
) -> Result<(&'a crate::model::FileHistory, usize)> {
    let file_history = history
        .files
        .get(path)
        .ok_or_else(|| Error::UnknownPath(path.clone()))?;
    let i = file_history.position(commit).ok_or_else(|| {
        Error::UnknownCommitForPath {
            commit: commit.clone(),
            path: path.clone(),
        }
    })?;
    Ok((file_history, i))
}

/// Computes the blame and future vectors for `path` as of `commit`.
///
/// Fails with [`Error::UnknownPath`] if `path` has no history, or
/// [`Error::UnknownCommitForPath`] if `commit` never touched `path` — the
/// `"HEAD"` alias is resolved by the caller (see
/// [`crate::index::resolve_commit`]) before reaching this function.
pub fn file_blame(
    history: &GitHistory,
    commit: &CommitHash,
    path: &BString,
    _config: &Config,
) -> Result<BlameResult> {
    scopetime::scope_time!("blame::file_blame");
    log::trace!("file_blame: commit {commit} path {path:?}");

    let (file_history, i) = file_history_and_position(history, commit, path)?;
    let commits = &file_history.commits;

    let segments_at = replay_forward(commits[..=i].iter());
    let blame_vector = flatten(&segments_at);

    let mut tip_segments = segments_at;
    for fc in &commits[i + 1..] {
        tip_segments = stepper::step(&tip_segments, &fc.commit_hash, &fc.hunks)
            .expect("GitHistory::build validates every file's hunks before publishing the index");
    }
    let terminal = terminalize(tip_segments);

    let mut rev_segments = terminal;
    for fc in commits[i + 1..].iter().rev() {
        let reversed_hunks: Vec<Hunk> =
            fc.hunks.iter().map(|h| h.reversed()).collect();
        rev_segments =
            stepper::step(&rev_segments, &fc.commit_hash, &reversed_hunks)
                .expect("a reversed history replays iff the forward history does");
    }
    let future_vector = flatten(&rev_segments);

    Ok(BlameResult {
        previous_commit_hash: i.checked_sub(1).map(|p| commits[p].commit_hash.clone()),
        next_commit_hash: commits.get(i + 1).map(|fc| fc.commit_hash.clone()),
        blame_vector,
        future_vector,
        hunks: commits[i].hunks.clone(),
    })
}

/// Identical to [`file_blame`]; kept as a distinct entry point because the
/// Diff Presenter only ever calls it with a commit already known to touch
/// `path` (it reads `path`'s history to find that commit in the first
/// place), whereas `file_blame` is the general-purpose query surface.
pub fn diff_blame(
    history: &GitHistory,
    commit: &CommitHash,
    path: &BString,
    config: &Config,
) -> Result<BlameResult> {
    file_blame(history, commit, path, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;
    use crate::model::Commit;

    fn build_history(commits: Vec<Commit>) -> GitHistory {
        index::build(commits).unwrap()
    }

    fn commit(hash: &str, path: &str, hunks: Vec<Hunk>) -> Commit {
        Commit {
            hash: CommitHash::new(hash),
            files: vec![(BString::from(path), hunks)],
        }
    }

    fn hash_vec(result: &BlameResult) -> Vec<Option<String>> {
        result
            .blame_vector
            .iter()
            .map(|(h, _)| h.as_ref().map(|h| h.as_str().to_string()))
            .collect()
    }

    fn future_hash_vec(result: &BlameResult) -> Vec<Option<String>> {
        result
            .future_vector
            .iter()
            .map(|(h, _)| h.as_ref().map(|h| h.as_str().to_string()))
            .collect()
    }

    #[test]
    fn scenario_b_insertion_then_removal_of_inserted_line() {
        let commits = vec![
            commit(
                "a1",
                "f",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 3,
                }],
            ),
            commit(
                "b2",
                "f",
                vec![
                    Hunk {
                        old_start: 1,
                        old_length: 1,
                        new_start: 1,
                        new_length: 0,
                    },
                    Hunk {
                        old_start: 0,
                        old_length: 0,
                        new_start: 2,
                        new_length: 1,
                    },
                ],
            ),
        ];
        let history = build_history(commits);
        let config = Config::default();
        let path = BString::from("f");

        let at_a1 =
            file_blame(&history, &CommitHash::new("a1"), &path, &config)
                .unwrap();
        assert_eq!(
            hash_vec(&at_a1),
            vec![Some("a1".into()), Some("a1".into()), Some("a1".into())]
        );
        assert_eq!(
            future_hash_vec(&at_a1),
            vec![Some("b2".into()), None, None]
        );

        let at_b2 =
            file_blame(&history, &CommitHash::new("b2"), &path, &config)
                .unwrap();
        assert_eq!(
            hash_vec(&at_b2),
            vec![Some("a1".into()), Some("b2".into()), Some("a1".into())]
        );
        assert_eq!(future_hash_vec(&at_b2), vec![None, None, None]);
    }

    fn full_vec(vector: &BlameVector) -> Vec<(Option<String>, u32)> {
        vector
            .iter()
            .map(|(h, line_start)| (h.as_ref().map(|h| h.as_str().to_string()), *line_start))
            .collect()
    }

    #[test]
    fn scenario_a_insertion_then_edit_exact_vectors() {
        let commits = vec![
            commit(
                "a1",
                "f",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 3,
                }],
            ),
            Commit {
                hash: CommitHash::new("b2"),
                files: vec![(
                    BString::from("f"),
                    vec![
                        Hunk {
                            old_start: 0,
                            old_length: 0,
                            new_start: 2,
                            new_length: 2,
                        },
                        Hunk {
                            old_start: 0,
                            old_length: 0,
                            new_start: 5,
                            new_length: 2,
                        },
                    ],
                )],
            },
            Commit {
                hash: CommitHash::new("c3"),
                files: vec![(
                    BString::from("f"),
                    vec![
                        Hunk {
                            old_start: 1,
                            old_length: 1,
                            new_start: 1,
                            new_length: 0,
                        },
                        Hunk {
                            old_start: 4,
                            old_length: 2,
                            new_start: 3,
                            new_length: 1,
                        },
                    ],
                )],
            },
        ];
        let history = build_history(commits);
        let config = Config::default();
        let path = BString::from("f");

        let at_b2 =
            file_blame(&history, &CommitHash::new("b2"), &path, &config)
                .unwrap();

        let expected_blame = vec![
            (Some("a1".to_string()), 1),
            (Some("b2".to_string()), 2),
            (Some("b2".to_string()), 3),
            (Some("a1".to_string()), 2),
            (Some("b2".to_string()), 5),
            (Some("b2".to_string()), 6),
            (Some("a1".to_string()), 3),
        ];
        assert_eq!(full_vec(&at_b2.blame_vector), expected_blame);

        let expected_future = vec![
            (Some("c3".to_string()), 1),
            (None, 1),
            (None, 2),
            (Some("c3".to_string()), 4),
            (Some("c3".to_string()), 5),
            (None, 4),
            (None, 5),
        ];
        assert_eq!(full_vec(&at_b2.future_vector), expected_future);
    }

    #[test]
    fn scenario_c_file_creation_then_complete_deletion() {
        let commits = vec![
            commit(
                "a1",
                "f",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 3,
                }],
            ),
            commit(
                "b2",
                "f",
                vec![Hunk {
                    old_start: 1,
                    old_length: 3,
                    new_start: 0,
                    new_length: 0,
                }],
            ),
        ];
        let history = build_history(commits);
        let config = Config::default();
        let path = BString::from("f");

        let at_a1 =
            file_blame(&history, &CommitHash::new("a1"), &path, &config)
                .unwrap();
        assert_eq!(
            hash_vec(&at_a1),
            vec![Some("a1".into()), Some("a1".into()), Some("a1".into())]
        );
        assert_eq!(
            future_hash_vec(&at_a1),
            vec![Some("b2".into()), Some("b2".into()), Some("b2".into())]
        );

        let at_b2 =
            file_blame(&history, &CommitHash::new("b2"), &path, &config)
                .unwrap();
        assert!(at_b2.blame_vector.is_empty());
        assert!(at_b2.future_vector.is_empty());
    }

    #[test]
    fn scenario_d_append_only() {
        let commits = vec![
            commit(
                "a1",
                "f",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 3,
                }],
            ),
            commit(
                "b2",
                "f",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 4,
                    new_length: 1,
                }],
            ),
        ];
        let history = build_history(commits);
        let config = Config::default();
        let path = BString::from("f");

        let at_b2 =
            file_blame(&history, &CommitHash::new("b2"), &path, &config)
                .unwrap();
        assert_eq!(
            hash_vec(&at_b2),
            vec![
                Some("a1".into()),
                Some("a1".into()),
                Some("a1".into()),
                Some("b2".into())
            ]
        );
        assert_eq!(future_hash_vec(&at_b2), vec![None, None, None, None]);
    }

    #[test]
    fn scenario_e_unrelated_intervening_commit_navigation() {
        let commits = vec![
            commit(
                "a1",
                "README",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 3,
                }],
            ),
            commit(
                "b2",
                "hello.c",
                vec![Hunk {
                    old_start: 0,
                    old_length: 0,
                    new_start: 1,
                    new_length: 2,
                }],
            ),
            commit(
                "c3",
                "README",
                vec![Hunk {
                    old_start: 3,
                    old_length: 0,
                    new_start: 4,
                    new_length: 1,
                }],
            ),
        ];
        let history = build_history(commits);
        let config = Config::default();
        let path = BString::from("README");

        let at_a1 =
            file_blame(&history, &CommitHash::new("a1"), &path, &config)
                .unwrap();
        assert!(at_a1.previous_commit_hash.is_none());
        assert_eq!(at_a1.next_commit_hash.unwrap().as_str(), "c3");

        assert_eq!(
            history.files.get(&path).unwrap().commits.len(),
            2,
            "README's history must skip the unrelated hello.c commit"
        );
    }

    #[test]
    fn unknown_path_is_an_error() {
        let history = build_history(vec![commit(
            "a1",
            "f",
            vec![Hunk {
                old_start: 0,
                old_length: 0,
                new_start: 1,
                new_length: 1,
            }],
        )]);
        let err = file_blame(
            &history,
            &CommitHash::new("a1"),
            &BString::from("missing"),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownPath(_)));
    }

    #[test]
    fn commit_not_touching_path_is_an_error() {
        let history = build_history(vec![commit(
            "a1",
            "f",
            vec![Hunk {
                old_start: 0,
                old_length: 0,
                new_start: 1,
                new_length: 1,
            }],
        )]);
        let err = file_blame(
            &history,
            &CommitHash::new("zzzz"),
            &BString::from("f"),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownCommitForPath { .. }));
    }
}
