//! The Log Parser: turns the condensed first-parent log byte stream (§6.1)
//! into the parsed commit sequence the History Index organizes.

use crate::error::{Error, Result};
use crate::model::{Commit, CommitHash, Hunk};
use bstr::{BString, ByteSlice};
use std::io::BufRead;

const DEV_NULL: &[u8] = b"/dev/null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InCommit,
    /// Holding a `---` line, waiting for its matching `+++`.
    SawOldPath,
    InFile,
}

struct FileSection {
    path: BString,
    hunks: Vec<Hunk>,
}

/// Parses `reader` as a condensed first-parent log and calls `on_commit`
/// for every fully-parsed commit, in stream order.
///
/// `reader` may be arbitrarily large; lines are read one at a time rather
/// than buffered in full, so the only per-line cost is the line's own
/// length, even for pathological lines up to 100 MiB.
pub fn parse<R: BufRead>(
    mut reader: R,
    hash_prefix_len: usize,
    mut on_commit: impl FnMut(Commit),
) -> Result<()> {
    let mut state = State::Idle;
    let mut offset: u64 = 0;
    let mut line = Vec::new();

    let mut current_commit: Option<Commit> = None;
    let mut current_file: Option<FileSection> = None;
    let mut pending_old_path: Option<BString> = None;

    loop {
        line.clear();
        let start_offset = offset;
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        offset += read as u64;
        while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
            line.pop();
        }

        if let Some(hash) = line.strip_prefix(b"commit ") {
            flush_file(&mut current_file, &mut current_commit);
            flush_commit(&mut current_commit, &mut on_commit);

            let hash = std::str::from_utf8(hash).map_err(|_| {
                Error::Parse {
                    offset: start_offset,
                    message: "commit hash is not valid UTF-8".into(),
                }
            })?;
            current_commit = Some(Commit {
                hash: CommitHash::truncate(hash.trim(), hash_prefix_len),
                files: Vec::new(),
            });
            state = State::InCommit;
            pending_old_path = None;
            continue;
        }

        if let Some(path) = line.strip_prefix(b"--- ") {
            if !matches!(state, State::InCommit | State::InFile) {
                return Err(Error::Parse {
                    offset: start_offset,
                    message: "'---' line outside a commit".into(),
                });
            }
            flush_file(&mut current_file, &mut current_commit);
            pending_old_path = Some(BString::from(path.to_vec()));
            state = State::SawOldPath;
            continue;
        }

        if let Some(path) = line.strip_prefix(b"+++ ") {
            if state != State::SawOldPath {
                return Err(Error::Parse {
                    offset: start_offset,
                    message: "'+++' line without a preceding '---'".into(),
                });
            }
            let old_path = pending_old_path.take().unwrap_or_default();
            let new_path = BString::from(path.to_vec());
            let effective = if old_path.as_slice() == DEV_NULL {
                new_path
            } else if new_path.as_slice() == DEV_NULL {
                old_path
            } else {
                new_path
            };
            current_file = Some(FileSection {
                path: effective,
                hunks: Vec::new(),
            });
            state = State::InFile;
            continue;
        }

        if let Some(rest) = line.strip_prefix(b"@@ ") {
            if state != State::InFile {
                return Err(Error::Parse {
                    offset: start_offset,
                    message: "hunk header outside a file section".into(),
                });
            }
            let (hunk, stripped) =
                parse_hunk_header(rest, start_offset)?;
            if !stripped {
                let to_skip =
                    u64::from(hunk.old_length) + u64::from(hunk.new_length);
                skip_lines(&mut reader, &mut offset, to_skip)?;
            }
            current_file
                .as_mut()
                .expect("InFile implies current_file is set")
                .hunks
                .push(hunk);
            continue;
        }

        // Any other line inside a file section (e.g. a content line that
        // precedes the next header) is simply not something this grammar
        // expects between records; unstripped content lines are consumed
        // by `skip_lines` above, so reaching here means stray input.
        if state == State::InFile || state == State::InCommit {
            continue;
        }

        return Err(Error::Parse {
            offset: start_offset,
            message: format!(
                "unexpected line: {:?}",
                BString::from(line.clone())
            ),
        });
    }

    flush_file(&mut current_file, &mut current_commit);
    flush_commit(&mut current_commit, &mut on_commit);

    log::trace!("log parse finished at byte offset {offset}");
    Ok(())
}

fn flush_file(
    current_file: &mut Option<FileSection>,
    current_commit: &mut Option<Commit>,
) {
    if let (Some(file), Some(commit)) =
        (current_file.take(), current_commit.as_mut())
    {
        commit.files.push((file.path, file.hunks));
    }
}

fn flush_commit(
    current_commit: &mut Option<Commit>,
    on_commit: &mut impl FnMut(Commit),
) {
    if let Some(commit) = current_commit.take() {
        on_commit(commit);
    }
}

/// Parses `-<old_start>[,<old_length>] +<new_start>[,<new_length>] @@[-]`,
/// the remainder of a `@@ ` line. Returns the hunk and whether the trailing
/// `-` stripped-content marker was present.
fn parse_hunk_header(
    rest: &[u8],
    offset: u64,
) -> Result<(Hunk, bool)> {
    let text = rest.to_str().map_err(|_| Error::Parse {
        offset,
        message: "hunk header is not valid UTF-8".into(),
    })?;
    let text = text
        .strip_suffix("@@-")
        .map(|t| (t, true))
        .or_else(|| text.strip_suffix("@@").map(|t| (t, false)))
        .ok_or_else(|| Error::Parse {
            offset,
            message: format!("malformed hunk header: {text:?}"),
        })?;
    let (body, stripped) = text;
    let body = body.trim();

    let mut parts = body.split(' ');
    let old = parts.next().ok_or_else(|| malformed(offset, body))?;
    let new = parts.next().ok_or_else(|| malformed(offset, body))?;
    if parts.next().is_some() {
        return Err(malformed(offset, body));
    }

    let (old_start, old_length) = parse_range(old, '-', offset)?;
    let (new_start, new_length) = parse_range(new, '+', offset)?;

    Ok((
        Hunk {
            old_start,
            old_length,
            new_start,
            new_length,
        },
        stripped,
    ))
}

fn parse_range(
    field: &str,
    sigil: char,
    offset: u64,
) -> Result<(u32, u32)> {
    let field = field
        .strip_prefix(sigil)
        .ok_or_else(|| malformed(offset, field))?;
    let (start, length) = match field.split_once(',') {
        Some((start, length)) => (start, length),
        None => (field, "1"),
    };
    let start: u32 = start
        .parse()
        .map_err(|_| malformed(offset, field))?;
    let length: u32 = length
        .parse()
        .map_err(|_| malformed(offset, field))?;
    Ok((start, length))
}

fn malformed(offset: u64, context: &str) -> Error {
    Error::Parse {
        offset,
        message: format!("malformed hunk range: {context:?}"),
    }
}

fn skip_lines<R: BufRead>(
    reader: &mut R,
    offset: &mut u64,
    mut count: u64,
) -> Result<()> {
    let mut buf = Vec::new();
    while count > 0 {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Err(Error::Parse {
                offset: *offset,
                message: "stream truncated mid-hunk content".into(),
            });
        }
        *offset += read as u64;
        count -= 1;
    }
    Ok(())
}
