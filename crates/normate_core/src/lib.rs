//! Normate core: pure data model, report composition and the results-view state machine.
mod chat;
mod compose;
mod effect;
mod error;
mod model;
mod msg;
mod pagination;
mod perspective;
mod poll;
mod state;
mod submission;
mod update;
mod view_model;

pub use chat::{
    ChatMessage, ChatRequest, ChatSession, ReportContextSnapshot, Role, SendRejected,
    FALLBACK_REPLY, INTRO_MESSAGE,
};
pub use compose::{compose, compose_kinds, Section, SectionKind};
pub use effect::Effect;
pub use error::ErrorKind;
pub use model::{
    AbTest, AnalysisResult, Direction, FinancialImpact, HistoryEntry, Job, JobId, JobStatus,
    Level, QualEvidence, QuantEvidence, RecommendedAction, SentimentLabel, StatusReport,
    TrackedMetric,
};
pub use msg::Msg;
pub use pagination::{compute_page_offsets, PageFormat, PageGeometry, DEFAULT_MARGIN_MM};
pub use perspective::{
    banner, resolve, Banner, Perspective, PerspectiveView, UnknownPerspective, VisibilityDecision,
};
pub use poll::{
    AttemptOutcome, PollPhase, PollPolicy, PollState, PollStep, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
pub use state::ResultsState;
pub use submission::{validate_files, AnalysisContext, ContextError, FileRole};
pub use update::update;
pub use view_model::{ChatView, ReportViewModel};
