//! Heuristic parsing of unstructured log lines.
//!
//! Lines come from arbitrary writers, so nothing here can fail: fields that are not
//! recognized fall back to defaults and the message degrades to the raw text.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::{LogContext, LogLevel, LogLine};

/// Source file extensions recognized by [`LogLineParser::default`].
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] =
    &["php", "rs", "py", "js", "ts", "go", "rb", "java"];

static BRACKETED_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2}[.\d]*Z?)\]")
        .expect("bracketed timestamp pattern is valid")
});

static BARE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}").expect("bare timestamp pattern is valid")
});

static LEVEL_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ERROR|WARNING|WARN|INFO|DEBUG|TRACE)\b")
        .expect("level keyword pattern is valid")
});

static METHOD_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"->(\w+)\(").expect("method call pattern is valid"));

static DEFAULT_SOURCE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&source_location_pattern(DEFAULT_SOURCE_EXTENSIONS))
        .expect("default source location pattern is valid")
});

/// Errors raised while configuring a parser.
#[derive(Debug, Error)]
pub enum ParserError {
    /// No source extension was given.
    #[error("At least one source file extension is required")]
    NoExtensions,

    /// An extension contains characters other than letters, digits and `_`.
    #[error("Invalid source file extension: '{0}'")]
    InvalidExtension(String),

    /// The generated pattern failed to compile.
    #[error("Failed to compile source location pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn source_location_pattern(extensions: &[&str]) -> String {
    let alternatives: Vec<String> = extensions.iter().map(|e| regex::escape(e)).collect();
    format!(r"([/\w]+\.(?:{}))\b(?::(\d+))?", alternatives.join("|"))
}

/// Extracts the first timestamp found in `line`.
///
/// A bracketed ISO-like timestamp (`[2024-01-02T03:04:05.123Z]`) is preferred over a
/// bare `2024-01-02 03:04:05`.
#[must_use]
pub fn extract_timestamp(line: &str) -> Option<String> {
    if let Some(caps) = BRACKETED_TIMESTAMP.captures(line) {
        return Some(caps[1].to_string());
    }
    BARE_TIMESTAMP.find(line).map(|m| m.as_str().to_string())
}

/// Classifies the severity of `line`.
///
/// Keywords are searched as plain substrings, case-insensitively, in
/// [`LogLevel::SEARCH_ORDER`]; the first keyword present anywhere in the line wins.
/// Substring matching means a word such as "information" counts as `INFO`.
#[must_use]
pub fn extract_level(line: &str) -> LogLevel {
    let upper = line.to_ascii_uppercase();
    LogLevel::SEARCH_ORDER
        .into_iter()
        .find(|level| upper.contains(level.keyword()))
        .unwrap_or_default()
}

/// Returns `line` with timestamps and whole-word level keywords removed.
#[must_use]
pub fn extract_message(line: &str) -> String {
    let line = BRACKETED_TIMESTAMP.replace_all(line, "");
    let line = BARE_TIMESTAMP.replace_all(&line, "");
    let line = LEVEL_WORD.replace_all(&line, "");
    line.trim().to_string()
}

/// Parser turning raw log text into [`LogLine`]s.
///
/// # Example
///
/// ```
/// use shared::logs::LogLineParser;
/// use shared::models::LogLevel;
///
/// let parser = LogLineParser::new(&["php"]).unwrap();
/// let line = parser.parse(
///     "[2024-01-02 03:04:05] WARNING slow query in /src/Repo.php:88",
///     "app.log",
/// );
///
/// assert_eq!(line.timestamp.as_deref(), Some("2024-01-02 03:04:05"));
/// assert_eq!(line.level, LogLevel::Warning);
/// assert_eq!(line.context.file.as_deref(), Some("/src/Repo.php"));
/// assert_eq!(line.context.line, Some(88));
/// ```
#[derive(Debug, Clone)]
pub struct LogLineParser {
    source_location: Regex,
}

impl LogLineParser {
    /// Creates a parser that recognizes source paths with the given extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `extensions` is empty
    /// - an extension contains characters other than letters, digits and `_`
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self, ParserError> {
        if extensions.is_empty() {
            return Err(ParserError::NoExtensions);
        }

        let mut names = Vec::with_capacity(extensions.len());
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ParserError::InvalidExtension(ext.to_string()));
            }
            names.push(ext);
        }

        Ok(Self {
            source_location: Regex::new(&source_location_pattern(&names))?,
        })
    }

    /// Parses one raw line read from `source_file`.
    ///
    /// Never fails; unrecognized fields get their defaults.
    #[must_use]
    pub fn parse(&self, raw: &str, source_file: &str) -> LogLine {
        LogLine {
            raw: raw.to_string(),
            timestamp: extract_timestamp(raw),
            level: extract_level(raw),
            message: extract_message(raw),
            context: self.extract_context(raw),
            source_file: source_file.to_string(),
        }
    }

    /// Recovers the source location and invoked method mentioned in `line`.
    #[must_use]
    pub fn extract_context(&self, line: &str) -> LogContext {
        let mut context = LogContext::default();

        if let Some(caps) = self.source_location.captures(line) {
            context.file = Some(caps[1].to_string());
            context.line = caps.get(2).and_then(|m| m.as_str().parse().ok());
        }

        if let Some(caps) = METHOD_CALL.captures(line) {
            context.function = Some(caps[1].to_string());
        }

        context
    }
}

impl Default for LogLineParser {
    fn default() -> Self {
        Self {
            source_location: DEFAULT_SOURCE_LOCATION.clone(),
        }
    }
}
