use std::sync::Arc;

use normate_core::{Effect, Msg, PollPolicy};
use normate_engine::{deliver, ApiClient, DocumentExporter, PollEvent, RegionCapture, ResultPoller};
use normate_logging::{normate_info, normate_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const NO_SNAPSHOT: &str = "no rendered report snapshot was provided (use --snapshot)";

/// Executes controller effects and feeds their outcomes back as messages.
pub struct EffectRunner {
    client: Arc<dyn ApiClient>,
    policy: PollPolicy,
    exporter: Arc<DocumentExporter>,
    capture: Option<Arc<dyn RegionCapture>>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    poll_cancel: Option<CancellationToken>,
}

impl EffectRunner {
    pub fn new(
        client: Arc<dyn ApiClient>,
        policy: PollPolicy,
        exporter: DocumentExporter,
        capture: Option<Arc<dyn RegionCapture>>,
        msg_tx: mpsc::UnboundedSender<Msg>,
    ) -> Self {
        Self {
            client,
            policy,
            exporter: Arc::new(exporter),
            capture,
            msg_tx,
            poll_cancel: None,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling { job_id } => self.start_polling(job_id),
                Effect::CancelPolling => self.cancel_polling(),
                Effect::ExportReport { job_id } => self.export(job_id),
                Effect::SendChat { job_id, request } => {
                    let client = self.client.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let reply = deliver(client.as_ref(), &job_id, &request)
                            .await
                            .map_err(|kind| kind.to_string());
                        let _ = msg_tx.send(Msg::ChatReplied(reply));
                    });
                }
            }
        }
    }

    fn start_polling(&mut self, job_id: String) {
        self.cancel_polling();
        normate_info!("StartPolling job_id={}", job_id);

        let poller = Arc::new(ResultPoller::new(self.client.clone(), self.policy));
        let mut handle = poller.spawn(job_id);
        let cancel = handle.token();
        self.poll_cancel = Some(cancel.clone());

        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        handle.cancel();
                        break;
                    }
                    event = handle.next() => event,
                };
                let msg = match event {
                    Some(PollEvent::Progress(state)) => Msg::PollProgress(state),
                    Some(PollEvent::Finished(outcome)) => Msg::PollFinished(outcome),
                    None => break,
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    }

    fn cancel_polling(&mut self) {
        if let Some(cancel) = self.poll_cancel.take() {
            normate_info!("CancelPolling");
            cancel.cancel();
        }
    }

    fn export(&self, job_id: String) {
        let msg_tx = self.msg_tx.clone();
        let Some(capture) = self.capture.clone() else {
            normate_warn!("Export of job {} requested without a snapshot", job_id);
            let _ = msg_tx.send(Msg::ExportFinished(Err(NO_SNAPSHOT.to_string())));
            return;
        };
        let exporter = self.exporter.clone();
        tokio::spawn(async move {
            let outcome = exporter
                .export(&job_id, capture)
                .await
                .map(|summary| summary.path)
                .map_err(|err| err.to_string());
            let _ = msg_tx.send(Msg::ExportFinished(outcome));
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        self.cancel_polling();
    }
}
