use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub mod config;
pub mod logging;
pub mod protocol;
pub mod services;


pub use crate::config::{load_config, read_config, save_config, ConfigError, ResolverConfig};
pub use crate::logging::{ChannelLogger, LogCrateLogger, Logger};
pub use crate::protocol::types::{Diagnostic, OpcodeEntry, SystemLogLevel, VersionId};
pub use crate::services::loader::{
    load, load_file, LoadFailure, LoadReport, SkipReason, SkippedEntry,
};
pub use crate::services::probe::{FileVersionProbe, FixedVersionProbe, VersionProbe};
pub use crate::services::resolver::{LookupError, OpcodeResolver};
pub use crate::services::table::OpcodeTable;
pub use crate::services::throttle::{DiagnosticThrottle, DEFAULT_CEILING};

pub const CONFIG_ENV: &str = "OPCODE_RESOLVER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "resolver.json";

/// Picks the probe the config asks for: a pinned version, then a version file.
pub fn probe_from_config(config: &ResolverConfig) -> Arc<dyn VersionProbe> {
    match (&config.version, &config.version_file) {
        (Some(version), _) => Arc::new(FixedVersionProbe::known(version.clone())),
        (None, Some(path)) => Arc::new(FileVersionProbe::new(path.clone())),
        (None, None) => Arc::new(FixedVersionProbe::unknown()),
    }
}

/// Loads the table named by the config and wires up a resolver around it.
///
/// Skipped entries go to `logger` as warnings and a clean load as a success
/// note. A load failure is pushed through the resolver's throttle right away
/// so it counts against the same budget as lookup failures.
pub fn build_resolver(
    config: &ResolverConfig,
    logger: Arc<dyn Logger>,
) -> (OpcodeResolver, LoadReport) {
    let (table, report) = load_file(&config.opcodes_path);

    for skipped in &report.skipped {
        logger.log(SystemLogLevel::Warning, "Loader", &format!("Skipped {}", skipped));
    }

    let resolver = OpcodeResolver::with_logger(
        Arc::new(table),
        probe_from_config(config),
        config.diagnostic_ceiling,
        logger.clone(),
    );

    match &report.failure {
        Some(failure) => {
            resolver.report_load_failure(failure);
        }
        None => {
            let message = format!(
                "Loaded {} opcodes across {} versions from {}",
                resolver.table().len(),
                resolver.table().version_count(),
                config.opcodes_path.display()
            );
            logger.log(SystemLogLevel::Success, "Loader", &message);
        }
    }

    (resolver, report)
}

/// One JSON line per requested name.
pub fn render_lookup(name: &str, result: &Result<OpcodeEntry, LookupError>) -> serde_json::Value {
    match result {
        Ok(entry) => {
            serde_json::json!({ "name": name, "opcode": entry.opcode, "size": entry.size })
        }
        Err(e) => serde_json::json!({ "name": name, "error": e.to_string() }),
    }
}

pub fn run() {
    let config_path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    // The log filter comes from the config, so a config error is held until the logger is up
    let (config, config_error) = match read_config(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (ResolverConfig::default(), Some(e)),
    };

    let filter = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    env_logger::Builder::from_env(filter).init();

    if let Some(e) = config_error {
        log::warn!("[Config] {}", e);
    }

    let logger: Arc<dyn Logger> = Arc::new(LogCrateLogger);
    let (resolver, _) = build_resolver(&config, logger.clone());

    let names: Vec<String> = env::args().skip(1).collect();
    if names.is_empty() {
        let versions: Vec<&str> = resolver.table().versions().collect();
        let message = format!("No opcode names given; known versions: {:?}", versions);
        logger.log(SystemLogLevel::Info, "Resolver", &message);
        return;
    }

    for name in &names {
        let result = resolver.lookup(name);
        println!("{}", render_lookup(name, &result));
    }
}
