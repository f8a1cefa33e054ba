use std::path::PathBuf;

use crate::chat::ChatMessage;
use crate::compose::SectionKind;
use crate::perspective::{banner, Banner, Perspective};
use crate::poll::PollPhase;
use crate::ResultsState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportViewModel {
    pub job_id: String,
    pub phase: PollPhase,
    pub attempt: u32,
    pub error_message: Option<String>,
    pub perspective: Perspective,
    pub banner: Option<Banner>,
    pub sections: Vec<SectionKind>,
    pub can_export: bool,
    pub export_in_progress: bool,
    pub last_export: Option<PathBuf>,
    pub alert: Option<String>,
    pub chat: Option<ChatView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub open: bool,
    pub messages: Vec<ChatMessage>,
    pub in_flight: bool,
}

impl ResultsState {
    pub fn view(&self) -> ReportViewModel {
        let poll = self.poll();
        let ready = self.is_ready();
        let error_message = match poll.phase {
            PollPhase::Error => poll.last_error.as_ref().map(|kind| kind.user_message()),
            PollPhase::Loading | PollPhase::Ready => None,
        };

        ReportViewModel {
            job_id: self.job_id().to_string(),
            phase: poll.phase,
            attempt: poll.attempt,
            error_message,
            perspective: self.perspective(),
            banner: ready.then(|| banner(self.perspective())),
            sections: self.sections().iter().map(|s| s.kind()).collect(),
            can_export: ready && !self.export_in_progress(),
            export_in_progress: self.export_in_progress(),
            last_export: self.last_export().cloned(),
            alert: self.alert().map(str::to_string),
            chat: self.chat().map(|chat| ChatView {
                open: self.is_chat_open(),
                messages: chat.transcript().to_vec(),
                in_flight: chat.is_in_flight(),
            }),
            dirty: self.is_dirty(),
        }
    }
}
