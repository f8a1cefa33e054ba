//! Wire-level data model shared by the controller and the API client.
//!
//! Field names follow the backend's camelCase JSON. Every list defaults to empty so
//! partially populated payloads still deserialize.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantEvidence {
    pub metric: String,
    pub value: String,
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualEvidence {
    pub theme: String,
    pub sentiment: f64,
    pub sentiment_label: SentimentLabel,
    #[serde(default)]
    pub quotes: Vec<String>,
}

/// Impact and difficulty share the backend's `High | Medium | Low` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub evidence: String,
    pub impact: Level,
    pub difficulty: Level,
    #[serde(default)]
    pub estimated_effect: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub name: String,
    pub control: String,
    pub treatment: String,
    pub metric: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedMetric {
    pub name: String,
    pub current: String,
    pub target: String,
}

/// Business-impact estimate. Fields the client does not know about are kept in
/// `extra` so they survive a round trip into the chat context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialImpact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_at_risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_recovery: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A completed analysis. Only ever built from a `completed` status payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub job_id: JobId,
    #[serde(default)]
    pub problem_summary: String,
    #[serde(default)]
    pub quant_evidence: Vec<QuantEvidence>,
    #[serde(default)]
    pub qual_evidence: Vec<QualEvidence>,
    #[serde(default)]
    pub actions: Vec<RecommendedAction>,
    #[serde(default)]
    pub ab_tests: Vec<AbTest>,
    #[serde(default)]
    pub metrics: Vec<TrackedMetric>,
    #[serde(default)]
    pub financial_impact: Option<FinancialImpact>,
    #[serde(default)]
    pub suggested_questions: Option<Vec<String>>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl AnalysisResult {
    /// Suggested questions, treating an absent list like an empty one.
    pub fn suggested_questions(&self) -> &[String] {
        self.suggested_questions.as_deref().unwrap_or(&[])
    }
}

/// What one status fetch told us about a job.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    NotReady { status: JobStatus },
    Completed(Box<AnalysisResult>),
    Failed { reason: String },
}

/// Summary row as returned by the history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "jobId")]
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub research_question: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}
