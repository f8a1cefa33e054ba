use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::ChatSession;
use crate::compose::{compose, Section};
use crate::model::{AnalysisResult, JobId};
use crate::perspective::Perspective;
use crate::poll::{PollPhase, PollState};

/// Everything the results view owns for one job. Passed explicitly through
/// `update`; there is no ambient UI state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsState {
    job_id: JobId,
    poll: PollState,
    polling: bool,
    result: Option<Arc<AnalysisResult>>,
    perspective: Perspective,
    chat: Option<ChatSession>,
    chat_open: bool,
    export_in_progress: bool,
    last_export: Option<PathBuf>,
    alert: Option<String>,
    dirty: bool,
}

impl ResultsState {
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn poll(&self) -> &PollState {
        &self.poll
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        self.result.as_ref()
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.poll.phase == PollPhase::Ready && self.result.is_some()
    }

    /// Sections for the current perspective; empty until the result is in.
    pub fn sections(&self) -> Vec<Section<'_>> {
        match self.result.as_deref() {
            Some(result) if self.poll.phase == PollPhase::Ready => {
                compose(result, self.perspective)
            }
            _ => Vec::new(),
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.polling
    }

    pub(crate) fn set_polling(&mut self, polling: bool) {
        self.polling = polling;
    }

    pub(crate) fn set_poll(&mut self, poll: PollState) {
        self.poll = poll;
    }

    pub(crate) fn set_result(&mut self, result: Arc<AnalysisResult>) {
        self.result = Some(result);
    }

    pub(crate) fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    pub(crate) fn chat_mut(&mut self) -> Option<&mut ChatSession> {
        self.chat.as_mut()
    }

    pub(crate) fn ensure_chat(&mut self) -> Option<&mut ChatSession> {
        if self.chat.is_none() {
            let result = self.result.as_deref()?;
            self.chat = Some(ChatSession::for_result(result));
        }
        self.chat.as_mut()
    }

    pub(crate) fn discard_chat(&mut self) {
        self.chat = None;
        self.chat_open = false;
    }

    pub(crate) fn is_chat_open(&self) -> bool {
        self.chat_open
    }

    pub(crate) fn set_chat_open(&mut self, open: bool) {
        self.chat_open = open;
    }

    pub(crate) fn export_in_progress(&self) -> bool {
        self.export_in_progress
    }

    pub(crate) fn set_export_in_progress(&mut self, busy: bool) {
        self.export_in_progress = busy;
    }

    pub(crate) fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    pub(crate) fn set_last_export(&mut self, path: PathBuf) {
        self.last_export = Some(path);
    }

    pub(crate) fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub(crate) fn set_alert(&mut self, alert: Option<String>) {
        self.alert = alert;
    }
}
