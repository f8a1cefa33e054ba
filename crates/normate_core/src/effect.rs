use crate::chat::ChatRequest;
use crate::model::JobId;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartPolling { job_id: JobId },
    CancelPolling,
    ExportReport { job_id: JobId },
    SendChat { job_id: JobId, request: ChatRequest },
}
