//! Bounded poll for a drag surface that may not exist yet.
//!
//! Widgets can be created before their plan's surface is in the DOM. The
//! bridge looks the surface up, feeds the result here, and either proceeds,
//! sleeps `after_ms`, or gives up.

use fp_core::{EngineConfig, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Found,
    Retry { after_ms: u32 },
    TimedOut { waited_ms: u32 },
}

#[derive(Debug, Clone)]
pub struct AnchorPoll {
    timeout_ms: u32,
    interval_ms: u32,
    elapsed_ms: u32,
}

impl AnchorPoll {
    pub fn new(timeout_ms: u32, interval_ms: u32) -> Self {
        Self {
            timeout_ms,
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.anchor_timeout_ms, config.anchor_poll_interval_ms)
    }

    /// Record one lookup result.
    pub fn step(&mut self, found: bool) -> PollStep {
        if found {
            return PollStep::Found;
        }
        if self.elapsed_ms >= self.timeout_ms {
            return PollStep::TimedOut {
                waited_ms: self.elapsed_ms,
            };
        }
        let after_ms = self.interval_ms.min(self.timeout_ms - self.elapsed_ms);
        self.elapsed_ms += after_ms;
        PollStep::Retry { after_ms }
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// The error a timed-out poll turns into.
    pub fn timeout_error(&self, anchor: &str) -> EngineError {
        EngineError::AnchorTimeout {
            anchor: anchor.to_string(),
            waited_ms: self.elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_immediately() {
        let mut poll = AnchorPoll::new(2000, 100);
        assert_eq!(poll.step(true), PollStep::Found);
        assert_eq!(poll.elapsed_ms(), 0);
    }

    #[test]
    fn last_retry_is_shortened_to_budget() {
        let mut poll = AnchorPoll::new(250, 100);
        assert_eq!(poll.step(false), PollStep::Retry { after_ms: 100 });
        assert_eq!(poll.step(false), PollStep::Retry { after_ms: 100 });
        assert_eq!(poll.step(false), PollStep::Retry { after_ms: 50 });
        assert_eq!(poll.step(false), PollStep::TimedOut { waited_ms: 250 });
    }

    #[test]
    fn zero_interval_still_progresses() {
        let mut poll = AnchorPoll::new(2, 0);
        assert_eq!(poll.step(false), PollStep::Retry { after_ms: 1 });
    }
}
