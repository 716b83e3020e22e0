use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::protocol::parser::normalize_jsonc;
use crate::protocol::types::OpcodeEntry;
use crate::services::table::OpcodeTable;

/// Why a whole source document was replaced by an empty table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("opcode source is empty")]
    Empty,

    #[error("opcode source is malformed: {0}")]
    Malformed(String),

    #[error("could not read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Why one version block or entry was dropped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("expected an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` is not a non-negative integer")]
    NotAnInteger(&'static str),

    #[error("field `{0}` does not fit in 32 bits")]
    OutOfRange(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub version: String,
    /// `None` when the whole version block was dropped.
    pub name: Option<String>,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}: {}", self.version, name, self.reason),
            None => write!(f, "{}: {}", self.version, self.reason),
        }
    }
}

/// Outcome of a load besides the table itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub failure: Option<LoadFailure>,
    pub skipped: Vec<SkippedEntry>,
}

impl LoadReport {
    fn failed(failure: LoadFailure) -> Self {
        Self { failure: Some(failure), skipped: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.failure.is_none() && self.skipped.is_empty()
    }
}

/// Parses an opcode document. Never fails: a broken document gives an empty
/// table and a `LoadFailure` in the report.
///
/// Repeated (version, name) pairs, including a version key that appears twice,
/// resolve to the last occurrence in the text.
pub fn load(source: &str) -> (OpcodeTable, LoadReport) {
    // Files saved by Windows editors often lead with a UTF-8 BOM
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    if source.trim().is_empty() {
        return (OpcodeTable::new(), LoadReport::failed(LoadFailure::Empty));
    }

    let strict = normalize_jsonc(source);

    // serde_json keeps only the last value of a duplicated key, which is the
    // override rule we want, so parse straight into a Value.
    let root: Value = match serde_json::from_str(&strict) {
        Ok(v) => v,
        Err(e) => {
            return (OpcodeTable::new(), LoadReport::failed(LoadFailure::Malformed(e.to_string())));
        }
    };

    let versions = match root.as_object() {
        Some(obj) => obj,
        None => {
            let failure = LoadFailure::Malformed("top level is not an object".to_string());
            return (OpcodeTable::new(), LoadReport::failed(failure));
        }
    };

    let mut table = OpcodeTable::new();
    let mut report = LoadReport::default();

    for (version, block) in versions {
        let Some(entries) = block.as_object() else {
            report.skipped.push(SkippedEntry {
                version: version.clone(),
                name: None,
                reason: SkipReason::NotAnObject,
            });
            continue;
        };

        table.ensure_version(version);
        load_version(version, entries, &mut table, &mut report);
    }

    (table, report)
}

/// Reads and parses a file; I/O errors become `LoadFailure::Unreadable`.
pub fn load_file(path: &Path) -> (OpcodeTable, LoadReport) {
    match fs::read_to_string(path) {
        Ok(content) => load(&content),
        Err(e) => {
            let failure = LoadFailure::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            };
            (OpcodeTable::new(), LoadReport::failed(failure))
        }
    }
}

fn load_version(version: &str, entries: &Map<String, Value>, table: &mut OpcodeTable, report: &mut LoadReport) {
    for (name, raw) in entries {
        match parse_entry(raw) {
            Ok(entry) => table.insert(version, name, entry),
            Err(reason) => report.skipped.push(SkippedEntry {
                version: version.to_string(),
                name: Some(name.clone()),
                reason,
            }),
        }
    }
}

// Strict shape: {opcode: u32, size: u32}. Extra fields are ignored.
fn parse_entry(raw: &Value) -> Result<OpcodeEntry, SkipReason> {
    let obj = raw.as_object().ok_or(SkipReason::NotAnObject)?;
    let opcode = read_u32(obj, "opcode")?;
    let size = read_u32(obj, "size")?;
    Ok(OpcodeEntry::new(opcode, size))
}

fn read_u32(obj: &Map<String, Value>, field: &'static str) -> Result<u32, SkipReason> {
    let value = obj.get(field).ok_or(SkipReason::MissingField(field))?;
    let wide = value.as_u64().ok_or(SkipReason::NotAnInteger(field))?;
    u32::try_from(wide).map_err(|_| SkipReason::OutOfRange(field))
}
