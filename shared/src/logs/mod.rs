//! Log file reading, parsing and aggregation.
//!
//! - [`tail`] - backward chunked reading of the last lines of a file
//! - [`parser`] - heuristic extraction of timestamp, level and source context
//! - [`aggregator`] - merging the tails of every log file in a directory

pub mod aggregator;
pub mod parser;
pub mod tail;

pub use aggregator::{
    AggregatedLogs, FileTail, LogAggregator, LogSource, RawLogLine, FALLBACK_LOG_FILE,
};
pub use parser::{
    extract_level, extract_message, extract_timestamp, LogLineParser, ParserError,
    DEFAULT_SOURCE_EXTENSIONS,
};
pub use tail::{tail, tail_reader, TailLine, CHUNK_SIZE};
