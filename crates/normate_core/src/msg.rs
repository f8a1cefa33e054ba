use std::path::PathBuf;

use crate::error::ErrorKind;
use crate::model::AnalysisResult;
use crate::perspective::Perspective;
use crate::poll::PollState;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The results view was opened for its job.
    Mounted,
    /// The results view is going away; polling stops and chat is discarded.
    Unmounted,
    /// Poller reported a non-terminal attempt.
    PollProgress(PollState),
    /// Poller reached a terminal state.
    PollFinished(Result<Box<AnalysisResult>, ErrorKind>),
    /// User switched perspective.
    PerspectiveSelected(Perspective),
    /// User clicked Export.
    ExportRequested,
    /// Export finished, with the written file or a failure message.
    ExportFinished(Result<PathBuf, String>),
    /// Chat panel opened, optionally seeded with a question to send once.
    ChatOpened { initial_question: Option<String> },
    /// User picked one of the result's suggested questions.
    SuggestedQuestionSelected(usize),
    /// User submitted a chat message.
    ChatSubmitted(String),
    /// Chat backend answered (or failed).
    ChatReplied(Result<String, String>),
    /// Chat panel hidden; the session stays until the view unmounts.
    ChatClosed,
    /// User acknowledged the blocking alert.
    AlertDismissed,
}
