mod jsonl;

pub use jsonl::JsonLinesSource;

use thiserror::Error;

/// One raw uplink record as read from an input, before JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkEvent {
    /// 1-based line number within the input.
    pub line: usize,
    pub text: String,
}

pub trait UplinkSource {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
