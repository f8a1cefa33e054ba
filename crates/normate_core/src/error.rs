use std::fmt;

/// Failure taxonomy of the results experience.
///
/// Only the polling kinds (`AnalysisFailed`, `Timeout`, `StatusUnavailable`) ever
/// reach the page-level state; export and chat failures stay local to their action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The job is still running; polling continues.
    TransientNotReady,
    /// The backend reported the analysis as failed.
    AnalysisFailed { reason: String },
    /// The attempt budget ran out before a terminal status was seen.
    Timeout { attempts: u32 },
    /// A status fetch failed for a reason other than "not ready yet".
    StatusUnavailable { message: String },
    /// Capture or page composition of the export failed.
    ExportFailed { message: String },
    /// A chat request failed; the session shows the fallback reply.
    ChatRequestFailed { message: String },
}

impl ErrorKind {
    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ErrorKind::TransientNotReady => "Analysis is still running.".to_string(),
            ErrorKind::AnalysisFailed { reason } => {
                format!("Analysis failed: {reason}. Reload the page to start over.")
            }
            ErrorKind::Timeout { .. } => {
                "The analysis is taking longer than expected. Please try again.".to_string()
            }
            ErrorKind::StatusUnavailable { message } => {
                format!("Could not load results: {message}")
            }
            ErrorKind::ExportFailed { .. } => {
                "Failed to export the report as PDF. Please try again.".to_string()
            }
            ErrorKind::ChatRequestFailed { .. } => crate::chat::FALLBACK_REPLY.to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TransientNotReady => write!(f, "not ready"),
            ErrorKind::AnalysisFailed { reason } => write!(f, "analysis failed: {reason}"),
            ErrorKind::Timeout { attempts } => write!(f, "timed out after {attempts} attempts"),
            ErrorKind::StatusUnavailable { message } => write!(f, "status unavailable: {message}"),
            ErrorKind::ExportFailed { message } => write!(f, "export failed: {message}"),
            ErrorKind::ChatRequestFailed { message } => write!(f, "chat request failed: {message}"),
        }
    }
}
