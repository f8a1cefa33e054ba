#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use normate_core::{
    AnalysisResult, ChatRequest, HistoryEntry, Job, JobStatus, StatusReport,
};
use normate_engine::{ApiClient, ApiError, ApiFailureKind, PollEvent, PollSink, SubmissionUpload};
use serde_json::{json, Value};
use tokio::sync::Notify;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(normate_logging::initialize_for_tests);
}

/// Body of a completed `GET /api/results/{id}` response.
pub fn completed_body(job_id: &str) -> Value {
    json!({
        "jobId": job_id,
        "status": "completed",
        "problemSummary": "Trial users churn before their first export.",
        "quantEvidence": [
            { "metric": "Trial conversion", "value": "8.1%", "change": "-3pp", "direction": "down" }
        ],
        "qualEvidence": [
            { "theme": "Export confusion", "sentiment": -0.4, "sentimentLabel": "negative",
              "quotes": ["I could not find the export button"] }
        ],
        "actions": [
            { "title": "Surface export", "description": "Move export into the toolbar.",
              "evidence": "Quotes + conversion drop", "impact": "High", "difficulty": "Low",
              "estimatedEffect": "+2pp conversion" }
        ],
        "abTests": [
            { "name": "Toolbar export", "control": "Menu", "treatment": "Toolbar",
              "metric": "Trial conversion", "duration": "2 weeks" }
        ],
        "metrics": [
            { "name": "Trial conversion", "current": "8.1%", "target": "10%" }
        ],
        "suggestedQuestions": ["Which plan converts best?"],
        "financialImpact": { "summary": "$4k MRR at risk", "arpu": 29.0 },
        "generatedAt": "2026-10-18T10:00:00",
        "_debug": { "quant_row_count": 120 }
    })
}

pub fn completed_result(job_id: &str) -> AnalysisResult {
    serde_json::from_value(completed_body(job_id)).expect("fixture deserializes")
}

pub fn processing() -> Result<StatusReport, ApiError> {
    Ok(StatusReport::NotReady {
        status: JobStatus::Processing,
    })
}

/// In-memory backend that replays scripted status responses.
///
/// Once the script is exhausted it keeps answering `processing`.
#[derive(Default)]
pub struct ScriptedClient {
    statuses: Mutex<VecDeque<Result<StatusReport, ApiError>>>,
    chat_replies: Mutex<VecDeque<Result<String, ApiError>>>,
    pub status_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub chat_questions: Mutex<Vec<String>>,
    /// When set, every status fetch parks until the gate is notified.
    fetch_gate: Option<Arc<Notify>>,
    pub fetch_started: Notify,
}

impl ScriptedClient {
    pub fn with_statuses(statuses: Vec<Result<StatusReport, ApiError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    pub fn gated(statuses: Vec<Result<StatusReport, ApiError>>, gate: Arc<Notify>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            fetch_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn with_chat_replies(replies: Vec<Result<String, ApiError>>) -> Self {
        Self {
            chat_replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ApiClient for ScriptedClient {
    async fn submit(&self, _upload: &SubmissionUpload) -> Result<Job, ApiError> {
        Err(ApiError::new(ApiFailureKind::InvalidRequest, "not scripted"))
    }

    async fn get_status(&self, _job_id: &str) -> Result<StatusReport, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_one();
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(processing)
    }

    async fn chat(&self, _job_id: &str, request: &ChatRequest) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_questions
            .lock()
            .unwrap()
            .push(request.question.clone());
        let next = self.chat_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ApiError::new(ApiFailureKind::Network, "no reply scripted")))
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn delete_history_item(&self, _job_id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn wipe_history(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PollEvent>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl PollSink for RecordingSink {
    fn emit(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}
