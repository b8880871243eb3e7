//! Backward chunked reading of the last lines of a file.
//!
//! Log files can be large and are appended to by another process, so the tail is
//! read from the end in fixed-size chunks and stops as soon as enough matching
//! lines are found. Memory use is bounded by one chunk plus the longest line.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Size of each backward read.
pub const CHUNK_SIZE: u64 = 8192;

/// A line returned by the tail reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailLine {
    /// The trimmed line text.
    pub line: String,
    /// Byte offset in the file where the line starts.
    pub offset: u64,
}

/// Returns the last `max_lines` non-empty lines of the file at `path`, oldest first.
///
/// Lines are trimmed; lines that are empty after trimming are skipped and do not
/// count toward `max_lines`. When `filter` is a non-empty string only lines that
/// contain it (case-insensitively) are returned.
///
/// A missing or unreadable file yields an empty result.
///
/// # Example
///
/// ```no_run
/// use shared::logs::tail;
/// use std::path::Path;
///
/// let lines = tail(Path::new("var/log/app.log"), 100, Some("error"));
/// for line in lines {
///     println!("{}", line.line);
/// }
/// ```
#[must_use]
pub fn tail(path: &Path, max_lines: usize, filter: Option<&str>) -> Vec<TailLine> {
    if max_lines == 0 {
        return Vec::new();
    }

    let result = File::open(path).and_then(|mut file| {
        let len = file.metadata()?.len();
        tail_reader(&mut file, len, max_lines, filter)
    });

    match result {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Log file not readable");
            Vec::new()
        }
    }
}

/// Tails any seekable reader of `len` bytes.
///
/// This is the engine behind [`tail`]; it is exposed so callers can tail
/// in-memory buffers or instrumented readers.
///
/// # Errors
///
/// Returns an error if seeking or reading the underlying reader fails.
pub fn tail_reader<R: Read + Seek>(
    reader: &mut R,
    len: u64,
    max_lines: usize,
    filter: Option<&str>,
) -> io::Result<Vec<TailLine>> {
    let mut collected = Vec::new();
    if max_lines == 0 || len == 0 {
        return Ok(collected);
    }

    let needle = filter.filter(|f| !f.is_empty()).map(str::to_lowercase);
    let matches = |line: &str| {
        needle
            .as_deref()
            .map_or(true, |n| line.to_lowercase().contains(n))
    };

    let chunk = CHUNK_SIZE.min(len);
    // `buffer` always holds the bytes starting at file offset `pos`.
    let mut pos = len;
    let mut buffer: Vec<u8> = Vec::new();

    while collected.len() < max_lines && pos > 0 {
        let read_len = chunk.min(pos);
        pos -= read_len;
        reader.seek(SeekFrom::Start(pos))?;

        let mut data = Vec::with_capacity(usize::try_from(read_len).unwrap_or_default());
        reader.by_ref().take(read_len).read_to_end(&mut data)?;
        data.extend_from_slice(&buffer);
        buffer = data;

        // Everything before the first newline may continue in the previous chunk.
        let Some(first_newline) = buffer.iter().position(|&b| b == b'\n') else {
            continue;
        };

        let mut end = buffer.len();
        while end > first_newline {
            let start = buffer[first_newline..end]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(first_newline, |i| first_newline + i)
                + 1;

            let text = String::from_utf8_lossy(&buffer[start..end]);
            let line = text.trim();
            if !line.is_empty() && matches(line) {
                collected.push(TailLine {
                    line: line.to_string(),
                    offset: pos + start as u64,
                });
                if collected.len() >= max_lines {
                    break;
                }
            }
            end = start - 1;
        }

        buffer.truncate(first_newline);
    }

    if pos == 0 && collected.len() < max_lines {
        let text = String::from_utf8_lossy(&buffer);
        let line = text.trim();
        if !line.is_empty() && matches(line) {
            collected.push(TailLine {
                line: line.to_string(),
                offset: 0,
            });
        }
    }

    collected.reverse();
    Ok(collected)
}
