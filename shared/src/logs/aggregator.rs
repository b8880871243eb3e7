//! Merged, newest-first view over every log file in a directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::thread;

use super::parser::{extract_timestamp, LogLineParser};
use super::tail::tail;
use crate::models::LogLine;
use crate::ordering::top_n_by_timestamp_desc;

/// File shown by the single-file viewer when the directory holds no log files.
pub const FALLBACK_LOG_FILE: &str = "error.log";

/// A directory of log files sharing one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    /// Directory holding the log files.
    pub dir: PathBuf,
    /// Extension (without the dot) that marks a file as a log.
    pub extension: String,
}

impl LogSource {
    /// Creates a log source.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Lists log file names, sorted descending.
    ///
    /// With date-suffixed names this puts the newest file first. A missing or
    /// unreadable directory yields an empty list.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %self.dir.display(), error = %e, "Log directory not readable");
                return Vec::new();
            }
        };

        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| self.is_log_file(&entry.path()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();

        files.sort_by(|a, b| b.cmp(a));
        files
    }

    fn is_log_file(&self, path: &Path) -> bool {
        path.is_file() && path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }
}

/// Result of merging the tails of all log files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedLogs {
    /// Parsed lines, newest first.
    pub entries: Vec<LogLine>,
    /// Log file names, sorted descending.
    pub files: Vec<String>,
}

impl AggregatedLogs {
    /// Number of entries returned.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.entries.len()
    }
}

/// A raw line shown by the single-file viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogLine {
    /// The trimmed line.
    pub line: String,
    /// Timestamp found in the line, if any.
    pub timestamp: Option<String>,
}

/// Tail of one selected log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTail {
    /// Lines of the selected file, oldest first.
    pub logs: Vec<RawLogLine>,
    /// All log file names, sorted descending.
    pub files: Vec<String>,
    /// The file that was read.
    pub current_file: String,
    /// Number of lines returned.
    pub total_lines: usize,
}

/// Reads, parses and merges the tails of every file in a [`LogSource`].
///
/// # Example
///
/// ```no_run
/// use shared::logs::{LogAggregator, LogLineParser, LogSource};
///
/// let aggregator = LogAggregator::new(LogSource::new("var/log", "log"), LogLineParser::default());
/// let recent = aggregator.collect(100, Some("error"));
/// for entry in &recent.entries {
///     println!("{} [{}] {}", entry.source_file, entry.level, entry.message);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LogAggregator {
    source: LogSource,
    parser: LogLineParser,
}

impl LogAggregator {
    /// Creates an aggregator over `source`.
    #[must_use]
    pub fn new(source: LogSource, parser: LogLineParser) -> Self {
        Self { source, parser }
    }

    /// Returns the log source.
    #[must_use]
    pub fn source(&self) -> &LogSource {
        &self.source
    }

    /// Returns the newest `max_lines` entries across all log files.
    ///
    /// Every file is tailed with the full `max_lines` budget and `filter`; the
    /// combined lines are then sorted newest-first by timestamp and truncated.
    #[must_use]
    pub fn collect(&self, max_lines: usize, filter: Option<&str>) -> AggregatedLogs {
        let files = self.source.list_files();
        let entries = files
            .iter()
            .flat_map(|name| self.read_file(name, max_lines, filter))
            .collect();

        AggregatedLogs {
            entries: top_n_by_timestamp_desc(entries, max_lines),
            files,
        }
    }

    /// Same as [`collect`](Self::collect), reading files on up to `workers` threads.
    ///
    /// The merge happens only after every reader has finished, so the output is
    /// identical to the sequential version.
    #[must_use]
    pub fn collect_parallel(
        &self,
        max_lines: usize,
        filter: Option<&str>,
        workers: usize,
    ) -> AggregatedLogs {
        let files = self.source.list_files();
        let workers = workers.clamp(1, files.len().max(1));
        let mut per_file: Vec<Vec<LogLine>> = vec![Vec::new(); files.len()];

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let files = &files;
                    scope.spawn(move || {
                        files
                            .iter()
                            .enumerate()
                            .skip(worker)
                            .step_by(workers)
                            .map(|(index, name)| (index, self.read_file(name, max_lines, filter)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(results) => {
                        for (index, lines) in results {
                            per_file[index] = lines;
                        }
                    }
                    Err(_) => tracing::warn!("Log reader thread panicked, skipping its files"),
                }
            }
        });

        let entries = per_file.into_iter().flatten().collect();
        AggregatedLogs {
            entries: top_n_by_timestamp_desc(entries, max_lines),
            files,
        }
    }

    /// Tails a single log file for the file viewer.
    ///
    /// `file` defaults to the newest log file, or [`FALLBACK_LOG_FILE`] when there is
    /// none. Only names listed in the log directory are read; anything else yields no
    /// lines.
    #[must_use]
    pub fn tail_file(&self, file: Option<&str>, max_lines: usize, filter: Option<&str>) -> FileTail {
        let files = self.source.list_files();
        let current_file = file
            .map(str::to_string)
            .or_else(|| files.first().cloned())
            .unwrap_or_else(|| FALLBACK_LOG_FILE.to_string());

        let logs: Vec<RawLogLine> = if files.contains(&current_file) {
            tail(&self.source.dir.join(&current_file), max_lines, filter)
                .into_iter()
                .map(|t| RawLogLine {
                    timestamp: extract_timestamp(&t.line),
                    line: t.line,
                })
                .collect()
        } else {
            tracing::debug!(file = %current_file, "Requested log file is not in the log directory");
            Vec::new()
        };

        FileTail {
            total_lines: logs.len(),
            logs,
            files,
            current_file,
        }
    }

    fn read_file(&self, name: &str, max_lines: usize, filter: Option<&str>) -> Vec<LogLine> {
        tail(&self.source.dir.join(name), max_lines, filter)
            .into_iter()
            .map(|t| self.parser.parse(&t.line, name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn aggregator(dir: &TempDir) -> LogAggregator {
        LogAggregator::new(LogSource::new(dir.path(), "log"), LogLineParser::default())
    }

    #[test]
    fn test_list_files_filters_and_sorts_descending() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app-2024-01-01.log", "a\n");
        write(&dir, "app-2024-03-01.log", "b\n");
        write(&dir, "notes.txt", "c\n");
        fs::create_dir(dir.path().join("archive.log")).unwrap();

        let files = aggregator(&dir).source().list_files();
        assert_eq!(files, ["app-2024-03-01.log", "app-2024-01-01.log"]);
    }

    #[test]
    fn test_missing_directory_yields_empty() {
        let source = LogSource::new("/no/such/dir", "log");
        let aggregator = LogAggregator::new(source, LogLineParser::default());

        let result = aggregator.collect(10, None);
        assert!(result.entries.is_empty());
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_merge_sorts_by_timestamp_regardless_of_file_order() {
        let dir = TempDir::new().unwrap();
        // "b.log" sorts before "a.log" but holds the older lines.
        write(
            &dir,
            "b.log",
            "[2024-01-01 10:00:00] INFO old one\n[2024-01-01 11:00:00] INFO old two\n",
        );
        write(
            &dir,
            "a.log",
            "[2024-02-01 10:00:00] ERROR new one\n[2024-02-01 11:00:00] WARN new two\n",
        );

        let result = aggregator(&dir).collect(100, None);

        let messages: Vec<_> = result.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["new two", "new one", "old two", "old one"]);
        assert_eq!(result.files, ["b.log", "a.log"]);
        assert_eq!(result.entries[0].source_file, "a.log");
        assert_eq!(result.total_lines(), 4);
    }

    #[test]
    fn test_each_file_gets_full_budget_then_global_truncate() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "a.log",
            "[2024-01-01 00:00:01] a1\n[2024-01-01 00:00:03] a3\n[2024-01-01 00:00:05] a5\n",
        );
        write(
            &dir,
            "b.log",
            "[2024-01-01 00:00:02] b2\n[2024-01-01 00:00:04] b4\n[2024-01-01 00:00:06] b6\n",
        );

        let result = aggregator(&dir).collect(3, None);
        let messages: Vec<_> = result.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["b6", "a5", "b4"]);
    }

    #[test]
    fn test_lines_without_timestamp_sort_last() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.log", "no timestamp here\n[2024-01-01 00:00:00] dated\n");

        let result = aggregator(&dir).collect(10, None);
        assert_eq!(result.entries[0].message, "dated");
        assert_eq!(result.entries[1].message, "no timestamp here");
        assert!(result.entries[1].timestamp.is_none());
    }

    #[test]
    fn test_filter_is_applied_per_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.log", "[2024-01-01 00:00:00] ERROR db down\n[2024-01-01 00:00:01] INFO ok\n");
        write(&dir, "b.log", "[2024-01-01 00:00:02] error cache\n");

        let result = aggregator(&dir).collect(10, Some("error"));
        assert_eq!(result.entries.len(), 2);
        assert!(result.entries.iter().all(|e| e.raw.to_lowercase().contains("error")));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        for file in 0..5 {
            let content: String = (0..40)
                .map(|i| format!("[2024-01-01 00:{:02}:{:02}] INFO file {file} line {i}\n", i % 60, file))
                .collect();
            write(&dir, &format!("part-{file}.log"), &content);
        }

        let aggregator = aggregator(&dir);
        let sequential = aggregator.collect(30, None);
        for workers in [1, 2, 3, 8] {
            assert_eq!(aggregator.collect_parallel(30, None, workers), sequential);
        }
        assert_eq!(aggregator.collect_parallel(30, None, 0), sequential);
    }

    #[test]
    fn test_tail_file_defaults_to_newest_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app-1.log", "old\n");
        write(&dir, "app-2.log", "[2024-01-01 00:00:00] newest\nsecond\n");

        let view = aggregator(&dir).tail_file(None, 10, None);

        assert_eq!(view.current_file, "app-2.log");
        assert_eq!(view.total_lines, 2);
        assert_eq!(view.logs[0].timestamp.as_deref(), Some("2024-01-01 00:00:00"));
        assert_eq!(view.logs[1].line, "second");
        assert_eq!(view.files, ["app-2.log", "app-1.log"]);
    }

    #[test]
    fn test_tail_file_rejects_names_outside_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.log", "line\n");

        let view = aggregator(&dir).tail_file(Some("../secret.log"), 10, None);
        assert_eq!(view.current_file, "../secret.log");
        assert!(view.logs.is_empty());
    }

    #[test]
    fn test_tail_file_fallback_name_when_empty() {
        let dir = TempDir::new().unwrap();
        let view = aggregator(&dir).tail_file(None, 10, None);

        assert_eq!(view.current_file, FALLBACK_LOG_FILE);
        assert!(view.logs.is_empty());
        assert!(view.files.is_empty());
    }
}
