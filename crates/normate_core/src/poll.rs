//! Poll state machine. The engine owns the timer and the fetch; this module decides
//! what each attempt means.

use std::time::Duration;

use crate::error::ErrorKind;
use crate::model::{AnalysisResult, StatusReport};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    /// Constant delay between attempts; there is no backoff.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollState {
    pub phase: PollPhase,
    /// Attempts made so far for the current job; starts at zero.
    pub attempt: u32,
    pub last_error: Option<ErrorKind>,
}

/// What one status fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Report(StatusReport),
    /// The transport said "not yet" (HTTP 202) without a usable body.
    NotReadyTransport,
    /// Any other transport failure.
    TransportFailed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Schedule another attempt after the policy interval.
    Continue,
    Ready(Box<AnalysisResult>),
    /// Terminal error; `PollState::last_error` holds the kind.
    Stop,
}

impl PollState {
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != PollPhase::Loading
    }

    /// Fold one attempt into the state. Callers must not record after a terminal step.
    pub fn record(&mut self, outcome: AttemptOutcome, policy: &PollPolicy) -> PollStep {
        debug_assert!(!self.is_terminal(), "attempt recorded after terminal state");
        self.attempt = self.attempt.saturating_add(1);

        match outcome {
            AttemptOutcome::Report(StatusReport::Completed(result)) => {
                self.phase = PollPhase::Ready;
                self.last_error = None;
                PollStep::Ready(result)
            }
            AttemptOutcome::Report(StatusReport::Failed { reason }) => {
                self.fail(ErrorKind::AnalysisFailed { reason })
            }
            AttemptOutcome::TransportFailed { message } => {
                self.fail(ErrorKind::StatusUnavailable { message })
            }
            AttemptOutcome::Report(StatusReport::NotReady { .. })
            | AttemptOutcome::NotReadyTransport => {
                if self.attempt >= policy.max_attempts {
                    self.fail(ErrorKind::Timeout {
                        attempts: self.attempt,
                    })
                } else {
                    self.last_error = Some(ErrorKind::TransientNotReady);
                    PollStep::Continue
                }
            }
        }
    }

    fn fail(&mut self, kind: ErrorKind) -> PollStep {
        self.phase = PollPhase::Error;
        self.last_error = Some(kind);
        PollStep::Stop
    }
}
