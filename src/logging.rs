use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::protocol::types::{Diagnostic, SystemLogLevel};

/// Host-supplied sink for diagnostics.
pub trait Logger: Send + Sync {
    fn log(&self, level: SystemLogLevel, source: &str, message: &str);
}

/// Forwards to the `log` facade under the `opcodes` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateLogger;

impl Logger for LogCrateLogger {
    fn log(&self, level: SystemLogLevel, source: &str, message: &str) {
        let level: log::Level = level.into();
        log::log!(target: "opcodes", level, "[{}] {}", source, message);
    }
}

/// Queues every diagnostic on a channel so another thread (a UI, a test) can drain them.
#[derive(Debug, Clone)]
pub struct ChannelLogger {
    tx: Sender<Diagnostic>,
}

impl ChannelLogger {
    pub fn new(tx: Sender<Diagnostic>) -> Self {
        Self { tx }
    }

    pub fn unbounded() -> (Self, Receiver<Diagnostic>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }
}

impl Logger for ChannelLogger {
    fn log(&self, level: SystemLogLevel, source: &str, message: &str) {
        let diagnostic = Diagnostic {
            timestamp: chrono::Utc::now().timestamp_millis(),
            level,
            source: source.to_string(),
            message: message.to_string(),
        };
        // A dropped receiver just means nobody is listening anymore
        let _ = self.tx.send(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_logger_delivers_records() {
        let (logger, rx) = ChannelLogger::unbounded();
        logger.log(SystemLogLevel::Error, "Resolver", "No opcodes for game version 7.10");

        let got = rx.try_recv().unwrap();
        assert_eq!(got.level, SystemLogLevel::Error);
        assert_eq!(got.source, "Resolver");
        assert_eq!(got.message, "No opcodes for game version 7.10");
        assert!(got.timestamp > 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_logger_survives_closed_receiver() {
        let (logger, rx) = ChannelLogger::unbounded();
        drop(rx);
        logger.log(SystemLogLevel::Error, "Resolver", "nobody listens");
    }
}
