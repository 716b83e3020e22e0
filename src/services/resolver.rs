use std::sync::Arc;

use crate::logging::{LogCrateLogger, Logger};
use crate::protocol::types::{OpcodeEntry, VersionId};
use crate::services::loader::LoadFailure;
use crate::services::probe::VersionProbe;
use crate::services::table::OpcodeTable;
use crate::services::throttle::{DiagnosticThrottle, DEFAULT_CEILING};

const SOURCE: &str = "Resolver";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("could not detect game version")]
    NoVersion,

    #[error("no opcodes for game version {0}")]
    UnknownVersion(String),

    #[error("no opcode for game version {version}, opcode name {name}")]
    UnknownOpcode { version: String, name: String },
}

/// Resolves logical packet names to the opcode used by the running client.
///
/// Holds the table and probe read-only. The only state a lookup touches is
/// the diagnostic budget.
pub struct OpcodeResolver {
    table: Arc<OpcodeTable>,
    probe: Arc<dyn VersionProbe>,
    throttle: DiagnosticThrottle,
}

impl OpcodeResolver {
    /// Uses the default ceiling and routes diagnostics to the `log` facade.
    pub fn new(table: Arc<OpcodeTable>, probe: Arc<dyn VersionProbe>) -> Self {
        Self::with_logger(table, probe, DEFAULT_CEILING, Arc::new(LogCrateLogger))
    }

    pub fn with_logger(
        table: Arc<OpcodeTable>,
        probe: Arc<dyn VersionProbe>,
        ceiling: usize,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            table,
            probe,
            throttle: DiagnosticThrottle::new(ceiling, logger),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<OpcodeEntry, LookupError> {
        let result = self.resolve(name);
        if let Err(e) = &result {
            self.throttle.try_emit(SOURCE, &diagnostic_text(e));
        }
        result
    }

    /// `lookup` with the failure folded into `None`. The diagnostic is still emitted.
    pub fn lookup_entry(&self, name: &str) -> Option<OpcodeEntry> {
        self.lookup(name).ok()
    }

    /// Surfaces a failed table load through the same budget as lookup failures.
    pub fn report_load_failure(&self, failure: &LoadFailure) -> bool {
        self.throttle.try_emit("Loader", &format!("Could not load opcode table: {}", failure))
    }

    pub fn remaining_diagnostics(&self) -> usize {
        self.throttle.remaining()
    }

    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    fn resolve(&self, name: &str) -> Result<OpcodeEntry, LookupError> {
        let version = match self.probe.current_version() {
            VersionId::Known(v) => v,
            VersionId::Unknown => return Err(LookupError::NoVersion),
        };

        let Some(opcodes) = self.table.entries(&version) else {
            return Err(LookupError::UnknownVersion(version));
        };

        match opcodes.get(name) {
            Some(entry) => Ok(*entry),
            None => Err(LookupError::UnknownOpcode {
                version,
                name: name.to_string(),
            }),
        }
    }
}

fn diagnostic_text(error: &LookupError) -> String {
    match error {
        LookupError::NoVersion => "Could not detect game version".to_string(),
        LookupError::UnknownVersion(version) => format!("No opcodes for game version {}", version),
        LookupError::UnknownOpcode { version, name } => {
            format!("No opcode for game version {}, opcode name {}", version, name)
        }
    }
}

impl std::fmt::Debug for OpcodeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpcodeResolver")
            .field("versions", &self.table.version_count())
            .field("entries", &self.table.len())
            .field("throttle", &self.throttle)
            .finish()
    }
}
