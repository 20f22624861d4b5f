//! Polling supervision.
//!
//! Telegram allows a single `getUpdates` poller per token. When another
//! poller takes over, the dispatcher is shut down and restarted after an
//! exponentially growing delay. This module holds the state machine; the
//! bot loop in [`crate::bot`] drives it.

use std::time::Duration;

use appfactory_models::BotStatus;

/// Backoff parameters for restarting the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first restart.
    pub initial_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
    /// Restarts allowed before giving up.
    pub max_retries: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            max_retries: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before restart number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// How a dispatcher run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another poller uses the same token.
    Conflict,
    /// The dispatcher stopped on its own (e.g. Ctrl+C).
    Finished,
}

/// Poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    BackingOff { attempt: u32, delay: Duration },
    Stopped,
}

impl PollState {
    /// Status reported to the rest of the service.
    pub fn to_bot_status(self) -> BotStatus {
        match self {
            PollState::Polling => BotStatus::Polling,
            PollState::BackingOff { attempt, .. } => BotStatus::BackingOff { attempt },
            PollState::Stopped => BotStatus::Stopped,
        }
    }
}

/// Tracks restart attempts across dispatcher runs.
#[derive(Debug)]
pub struct Supervisor {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl Supervisor {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
        }
    }

    /// Consecutive conflicts since updates last flowed.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// A dispatcher run is starting.
    pub fn on_started(&mut self) -> PollState {
        PollState::Polling
    }

    /// A dispatcher run ended.
    ///
    /// `received_updates` resets the attempt counter first, so only
    /// back-to-back conflicts grow the delay.
    pub fn on_run_ended(&mut self, outcome: RunOutcome, received_updates: bool) -> PollState {
        if received_updates {
            self.attempt = 0;
        }

        match outcome {
            RunOutcome::Finished => PollState::Stopped,
            RunOutcome::Conflict => {
                self.attempt += 1;
                if self.attempt > self.policy.max_retries {
                    PollState::Stopped
                } else {
                    PollState::BackingOff {
                        attempt: self.attempt,
                        delay: self.policy.delay_for(self.attempt),
                    }
                }
            }
        }
    }
}
