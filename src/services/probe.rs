use std::fs;
use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

use crate::protocol::types::VersionId;

lazy_static! {
    // Client version files hold a single token such as "2024.07.24.0000.0000"
    static ref VERSION_PATTERN: Regex = Regex::new(r"^[0-9A-Za-z._-]+$").unwrap();
}

/// Reports which game client build is running.
pub trait VersionProbe: Send + Sync {
    fn current_version(&self) -> VersionId;
}

/// Always reports the version it was built with.
#[derive(Debug, Clone)]
pub struct FixedVersionProbe {
    version: VersionId,
}

impl FixedVersionProbe {
    pub fn new(version: VersionId) -> Self {
        Self { version }
    }

    pub fn known(version: impl Into<String>) -> Self {
        Self::new(VersionId::known(version))
    }

    pub fn unknown() -> Self {
        Self::new(VersionId::Unknown)
    }
}

impl VersionProbe for FixedVersionProbe {
    fn current_version(&self) -> VersionId {
        self.version.clone()
    }
}

/// Reads the client's version file on every call, so a patched client is
/// picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileVersionProbe {
    path: PathBuf,
}

impl FileVersionProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VersionProbe for FileVersionProbe {
    fn current_version(&self) -> VersionId {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_version_text(&content),
            Err(e) => {
                log::debug!("[Probe] Could not read {}: {}", self.path.display(), e);
                VersionId::Unknown
            }
        }
    }
}

pub(crate) fn parse_version_text(content: &str) -> VersionId {
    let version = content.trim();
    if VERSION_PATTERN.is_match(version) {
        VersionId::known(version)
    } else {
        VersionId::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fixed_probe() {
        assert_eq!(FixedVersionProbe::known("7.05").current_version(), VersionId::known("7.05"));
        assert_eq!(FixedVersionProbe::unknown().current_version(), VersionId::Unknown);
    }

    #[test]
    fn test_parse_version_text() {
        assert_eq!(parse_version_text("2024.07.24.0000.0000\r\n"), VersionId::known("2024.07.24.0000.0000"));
        assert_eq!(parse_version_text("7.05"), VersionId::known("7.05"));
        assert_eq!(parse_version_text(""), VersionId::Unknown);
        assert_eq!(parse_version_text("   \n"), VersionId::Unknown);
        assert_eq!(parse_version_text("7.05 beta"), VersionId::Unknown);
        assert_eq!(parse_version_text("\u{0}\u{1}garbage"), VersionId::Unknown);
    }

    #[test]
    fn test_file_probe_reads_and_follows_updates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "7.05\n").unwrap();
        let probe = FileVersionProbe::new(file.path());
        assert_eq!(probe.current_version(), VersionId::known("7.05"));

        std::fs::write(file.path(), "7.10").unwrap();
        assert_eq!(probe.current_version(), VersionId::known("7.10"));
    }

    #[test]
    fn test_file_probe_missing_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FileVersionProbe::new(dir.path().join("ffxivgame.ver"));
        assert_eq!(probe.current_version(), VersionId::Unknown);
    }
}
