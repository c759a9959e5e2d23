//! Error types for OpenDesk

use thiserror::Error;

/// OpenDesk error type
#[derive(Error, Debug)]
pub enum DeskError {
    /// Configuration cannot be used at all (fatal at startup)
    #[error("config error: {0}")]
    Config(String),

    /// A rule table failed to parse
    #[error("rule table error: {0}")]
    RuleTable(String),

    /// A level value outside 1..=4 was supplied
    #[error("invalid level: {0}")]
    InvalidLevel(u8),

    /// Roster query failed in a collaborator
    #[error("directory error: {0}")]
    Directory(String),

    /// Alert delivery failed in a collaborator
    #[error("alert sink error: {0}")]
    AlertSink(String),
}

/// Result type for OpenDesk
pub type DeskResult<T> = Result<T, DeskError>;
