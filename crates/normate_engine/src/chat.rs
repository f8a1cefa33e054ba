use std::sync::Arc;

use normate_core::{ChatMessage, ChatRequest, ChatSession, ErrorKind, SendRejected};
use normate_logging::{normate_debug, normate_warn};

use crate::api::ApiClient;

/// Send one chat request. A blank reply counts as a failure.
pub async fn deliver(
    client: &dyn ApiClient,
    job_id: &str,
    request: &ChatRequest,
) -> Result<String, ErrorKind> {
    normate_debug!("Chat request for job {}", job_id);
    match client.chat(job_id, request).await {
        Ok(reply) if !reply.trim().is_empty() => Ok(reply),
        Ok(_) => Err(ErrorKind::ChatRequestFailed {
            message: "empty reply".to_string(),
        }),
        Err(err) => {
            normate_warn!("Chat request for job {} failed: {}", job_id, err);
            Err(ErrorKind::ChatRequestFailed {
                message: err.to_string(),
            })
        }
    }
}

/// A chat session bound to a client, for front ends that do not route chat
/// through the results controller.
pub struct ChatRunner {
    client: Arc<dyn ApiClient>,
    job_id: String,
    session: ChatSession,
}

impl ChatRunner {
    pub fn new(client: Arc<dyn ApiClient>, job_id: impl Into<String>, session: ChatSession) -> Self {
        Self {
            client,
            job_id: job_id.into(),
            session,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.session.transcript()
    }

    /// Send `text` and wait for the reply (or the fallback).
    pub async fn send(&mut self, text: &str) -> Result<Option<&ChatMessage>, SendRejected> {
        let request = self.session.begin_send(text)?;
        self.finish(request).await;
        Ok(self.session.transcript().last())
    }

    /// Deliver the initial question once per session; later calls do nothing.
    pub async fn open_with(&mut self, initial_question: Option<&str>) -> Option<&ChatMessage> {
        let request = self.session.take_initial_question(initial_question)?;
        self.finish(request).await;
        self.session.transcript().last()
    }

    async fn finish(&mut self, request: ChatRequest) {
        let reply = deliver(self.client.as_ref(), &self.job_id, &request).await;
        self.session.complete(reply);
    }
}
