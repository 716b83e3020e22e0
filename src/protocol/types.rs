use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire opcode and expected payload length for one packet kind under one
/// client version.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeEntry {
    pub opcode: u32,
    pub size: u32,
}

impl OpcodeEntry {
    pub const fn new(opcode: u32, size: u32) -> Self {
        Self { opcode, size }
    }
}

/// Client version as reported by a `VersionProbe`.
///
/// `Unknown` is kept apart from `Known(String::new())` so an empty version
/// string can never be mistaken for "not detected".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionId {
    Known(String),
    Unknown,
}

impl VersionId {
    pub fn known(version: impl Into<String>) -> Self {
        VersionId::Known(version.into())
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            VersionId::Known(v) => Some(v.as_str()),
            VersionId::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, VersionId::Unknown)
    }
}

impl From<Option<String>> for VersionId {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => VersionId::Known(v),
            None => VersionId::Unknown,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionId::Known(v) => f.write_str(v),
            VersionId::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemLogLevel {
    Info,    // Startup notes from the binary
    Warning, // Entries skipped at load time
    Error,   // Lookup and load failures, throttled
    Success, // Table loaded
}

impl From<SystemLogLevel> for log::Level {
    fn from(level: SystemLogLevel) -> Self {
        match level {
            SystemLogLevel::Error => log::Level::Error,
            SystemLogLevel::Warning => log::Level::Warn,
            SystemLogLevel::Info | SystemLogLevel::Success => log::Level::Info,
        }
    }
}

/// One emitted diagnostic, as handed to channel-backed loggers.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub timestamp: i64,       // Milliseconds since epoch
    pub level: SystemLogLevel,
    pub source: String,       // "Resolver", "Loader"
    pub message: String,
}
