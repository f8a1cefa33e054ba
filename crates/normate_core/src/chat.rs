//! Follow-up chat over a completed report.
//!
//! The session only tracks the transcript and its guards; issuing the request is
//! the caller's job (`begin_send` hands back the request to issue, `complete`
//! folds the answer in).

use std::sync::Arc;

use serde::Serialize;

use crate::model::{
    AbTest, AnalysisResult, FinancialImpact, QualEvidence, QuantEvidence, RecommendedAction,
    TrackedMetric,
};

pub const INTRO_MESSAGE: &str = "Hi! I've read through this report. Ask me anything about the findings, the recommended actions or what to do next.";
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't answer that right now. Please try asking again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Fixed subset of a result handed to the chat backend as grounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContextSnapshot {
    pub problem_summary: String,
    pub quant_evidence: Vec<QuantEvidence>,
    pub qual_evidence: Vec<QualEvidence>,
    pub actions: Vec<RecommendedAction>,
    pub ab_tests: Vec<AbTest>,
    pub metrics: Vec<TrackedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_impact: Option<FinancialImpact>,
}

impl ReportContextSnapshot {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            problem_summary: result.problem_summary.clone(),
            quant_evidence: result.quant_evidence.clone(),
            qual_evidence: result.qual_evidence.clone(),
            actions: result.actions.clone(),
            ab_tests: result.ab_tests.clone(),
            metrics: result.metrics.clone(),
            financial_impact: result.financial_impact.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub question: String,
    pub context: Arc<ReportContextSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendRejected {
    #[error("message is blank")]
    Blank,
    #[error("a request is already in flight")]
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    context: Arc<ReportContextSnapshot>,
    in_flight: bool,
    initial_question_handled: bool,
    queued_question: Option<String>,
}

impl ChatSession {
    pub fn new(context: ReportContextSnapshot) -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(INTRO_MESSAGE)],
            context: Arc::new(context),
            in_flight: false,
            initial_question_handled: false,
            queued_question: None,
        }
    }

    pub fn for_result(result: &AnalysisResult) -> Self {
        Self::new(ReportContextSnapshot::from_result(result))
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn context(&self) -> &Arc<ReportContextSnapshot> {
        &self.context
    }

    /// Append the user's message and return the request to issue.
    pub fn begin_send(&mut self, text: &str) -> Result<ChatRequest, SendRejected> {
        let question = text.trim();
        if question.is_empty() {
            return Err(SendRejected::Blank);
        }
        if self.in_flight {
            return Err(SendRejected::InFlight);
        }

        self.transcript.push(ChatMessage::user(question));
        self.in_flight = true;
        Ok(ChatRequest {
            question: question.to_string(),
            context: Arc::clone(&self.context),
        })
    }

    /// One-shot injection of the question the session was opened with.
    ///
    /// Returns a request at most once per session, however many times the opening
    /// sequence runs. A question arriving while another request is in flight is
    /// queued and issued by [`ChatSession::take_queued`] once the reply lands.
    pub fn take_initial_question(&mut self, question: Option<&str>) -> Option<ChatRequest> {
        let question = question?;
        if self.initial_question_handled {
            return None;
        }
        match self.begin_send(question) {
            Ok(request) => {
                self.initial_question_handled = true;
                Some(request)
            }
            Err(SendRejected::InFlight) => {
                self.initial_question_handled = true;
                self.queued_question = Some(question.trim().to_string());
                None
            }
            Err(SendRejected::Blank) => None,
        }
    }

    /// Issue the queued opening question, if any and nothing is in flight.
    pub fn take_queued(&mut self) -> Option<ChatRequest> {
        if self.in_flight {
            return None;
        }
        let question = self.queued_question.take()?;
        self.begin_send(&question).ok()
    }

    /// Fold the answer to the in-flight request into the transcript.
    ///
    /// Any error becomes the fixed fallback reply. Returns `false` when nothing was
    /// in flight and the answer was dropped.
    pub fn complete<E>(&mut self, reply: Result<String, E>) -> bool {
        if !self.in_flight {
            return false;
        }
        self.in_flight = false;
        let content = match reply {
            Ok(message) if !message.trim().is_empty() => message,
            _ => FALLBACK_REPLY.to_string(),
        };
        self.transcript.push(ChatMessage::assistant(content));
        true
    }
}
