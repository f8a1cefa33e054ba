use std::sync::Arc;

use normate_core::{AttemptOutcome, ErrorKind, PollPolicy, PollState, PollStep};
use normate_logging::{normate_debug, normate_info, normate_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::PollEvent;

pub trait PollSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}

pub struct ChannelPollSink {
    tx: mpsc::UnboundedSender<PollEvent>,
}

impl ChannelPollSink {
    pub fn new(tx: mpsc::UnboundedSender<PollEvent>) -> Self {
        Self { tx }
    }
}

impl PollSink for ChannelPollSink {
    fn emit(&self, event: PollEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drives status fetches for one job until a terminal state, the attempt budget
/// runs out, or the token is cancelled.
pub struct ResultPoller {
    client: Arc<dyn ApiClient>,
    policy: PollPolicy,
}

impl ResultPoller {
    pub fn new(client: Arc<dyn ApiClient>, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    /// Run the poll loop to completion.
    ///
    /// Returns the terminal state, or `None` when cancelled. Nothing is emitted
    /// once the token is cancelled, including for a fetch that was in flight.
    pub async fn run(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        sink: &dyn PollSink,
    ) -> Option<PollState> {
        let mut state = PollState::loading();
        normate_info!(
            "Polling job {} (max_attempts={}, interval_ms={})",
            job_id,
            self.policy.max_attempts,
            self.policy.interval.as_millis()
        );

        loop {
            if cancel.is_cancelled() {
                return None;
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                fetched = self.client.get_status(job_id) => fetched,
            };
            if cancel.is_cancelled() {
                normate_debug!("Discarding status for job {} after cancel", job_id);
                return None;
            }

            let outcome = match fetched {
                Ok(report) => AttemptOutcome::Report(report),
                Err(err) if err.is_not_ready() => AttemptOutcome::NotReadyTransport,
                Err(err) => {
                    normate_warn!("Status fetch for job {} failed: {}", job_id, err);
                    AttemptOutcome::TransportFailed {
                        message: err.to_string(),
                    }
                }
            };

            match state.record(outcome, &self.policy) {
                PollStep::Continue => {
                    normate_debug!("Job {} not ready (attempt {})", job_id, state.attempt);
                    sink.emit(PollEvent::Progress(state.clone()));
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return None,
                        _ = tokio::time::sleep(self.policy.interval) => {}
                    }
                }
                PollStep::Ready(result) => {
                    normate_info!("Job {} ready after {} attempts", job_id, state.attempt);
                    sink.emit(PollEvent::Finished(Ok(result)));
                    return Some(state);
                }
                PollStep::Stop => {
                    let kind = state.last_error.clone().unwrap_or(ErrorKind::Timeout {
                        attempts: state.attempt,
                    });
                    normate_warn!("Job {} polling stopped: {}", job_id, kind);
                    sink.emit(PollEvent::Finished(Err(kind)));
                    return Some(state);
                }
            }
        }
    }

    /// Start polling on the current tokio runtime.
    pub fn spawn(self: Arc<Self>, job_id: impl Into<String>) -> PollHandle {
        let job_id = job_id.into();
        let cancel = CancellationToken::new();
        let (tx, events) = mpsc::unbounded_channel();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let sink = ChannelPollSink::new(tx);
            self.run(&job_id, &token, &sink).await
        });
        PollHandle {
            cancel,
            events,
            task: Some(task),
        }
    }
}

pub struct PollHandle {
    cancel: CancellationToken,
    events: mpsc::UnboundedReceiver<PollEvent>,
    task: Option<JoinHandle<Option<PollState>>>,
}

impl PollHandle {
    /// Next event, or `None` once the poll has ended or been cancelled.
    pub async fn next(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Stop polling. Events already queued are dropped with the receiver.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the poll task; `None` if it was cancelled or panicked.
    pub async fn join(mut self) -> Option<PollState> {
        let task = self.task.take()?;
        task.await.ok().flatten()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
