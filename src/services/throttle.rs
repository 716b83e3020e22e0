use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::logging::Logger;
use crate::protocol::types::SystemLogLevel;

pub const DEFAULT_CEILING: usize = 3;

/// Lets at most `ceiling` error diagnostics through over its lifetime.
///
/// The budget only ever goes down. A new throttle starts with a full budget.
pub struct DiagnosticThrottle {
    remaining: AtomicUsize,
    logger: Arc<dyn Logger>,
}

impl DiagnosticThrottle {
    pub fn new(ceiling: usize, logger: Arc<dyn Logger>) -> Self {
        Self {
            remaining: AtomicUsize::new(ceiling),
            logger,
        }
    }

    /// Emits `message` at error level if budget is left. Returns whether it was emitted.
    pub fn try_emit(&self, source: &str, message: &str) -> bool {
        // Decrement with floor at zero; a failed update means the budget is spent
        let claimed = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();

        if claimed {
            self.logger.log(SystemLogLevel::Error, source, message);
        }
        claimed
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for DiagnosticThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticThrottle")
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ChannelLogger;

    #[test]
    fn test_stops_after_ceiling() {
        let (logger, rx) = ChannelLogger::unbounded();
        let throttle = DiagnosticThrottle::new(3, Arc::new(logger));

        let results: Vec<bool> = (0..5).map(|i| throttle.try_emit("Test", &format!("failure {}", i))).collect();

        assert_eq!(results, vec![true, true, true, false, false]);
        assert_eq!(throttle.remaining(), 0);
        let messages: Vec<String> = rx.try_iter().map(|d| d.message).collect();
        assert_eq!(messages, vec!["failure 0", "failure 1", "failure 2"]);
    }

    #[test]
    fn test_zero_ceiling_is_silent() {
        let (logger, rx) = ChannelLogger::unbounded();
        let throttle = DiagnosticThrottle::new(0, Arc::new(logger));
        assert!(!throttle.try_emit("Test", "dropped"));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_emits_at_error_level() {
        let (logger, rx) = ChannelLogger::unbounded();
        let throttle = DiagnosticThrottle::new(1, Arc::new(logger));
        throttle.try_emit("Resolver", "boom");
        assert_eq!(rx.recv().unwrap().level, SystemLogLevel::Error);
    }

    #[test]
    fn test_exact_ceiling_under_contention() {
        let (logger, rx) = ChannelLogger::unbounded();
        let throttle = DiagnosticThrottle::new(DEFAULT_CEILING, Arc::new(logger));

        let emitted: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let throttle = &throttle;
                    s.spawn(move || {
                        (0..50)
                            .filter(|i| throttle.try_emit("Test", &format!("{}:{}", t, i)))
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(emitted, DEFAULT_CEILING);
        assert_eq!(rx.try_iter().count(), DEFAULT_CEILING);
        assert_eq!(throttle.remaining(), 0);
    }
}
