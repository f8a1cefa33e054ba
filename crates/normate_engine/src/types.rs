use std::fmt;

use normate_core::{AnalysisResult, ErrorKind, PollState};

/// Events published by a running poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A non-terminal attempt finished; carries the attempt counter.
    Progress(PollState),
    Finished(Result<Box<AnalysisResult>, ErrorKind>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// "Not yet" from the status endpoint; the only failure polling tolerates.
    pub fn is_not_ready(&self) -> bool {
        self.kind == ApiFailureKind::NotReady
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailureKind {
    InvalidUrl,
    InvalidRequest,
    NotReady,
    NotFound,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::InvalidUrl => write!(f, "invalid url"),
            ApiFailureKind::InvalidRequest => write!(f, "invalid request"),
            ApiFailureKind::NotReady => write!(f, "not ready"),
            ApiFailureKind::NotFound => write!(f, "not found"),
            ApiFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiFailureKind::Timeout => write!(f, "timeout"),
            ApiFailureKind::Decode => write!(f, "invalid response body"),
            ApiFailureKind::Network => write!(f, "network error"),
        }
    }
}
