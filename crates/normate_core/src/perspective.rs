//! Perspective-based visibility over a fixed result payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::AnalysisResult;

/// Stakeholder role used to pick which prepared sections are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    #[default]
    Pm,
    Cfo,
    Designer,
}

impl Perspective {
    pub const ALL: [Perspective; 3] = [Perspective::Pm, Perspective::Cfo, Perspective::Designer];

    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Pm => "pm",
            Perspective::Cfo => "cfo",
            Perspective::Designer => "designer",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown perspective '{0}' (expected pm, cfo or designer)")]
pub struct UnknownPerspective(pub String);

impl FromStr for Perspective {
    type Err = UnknownPerspective;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm" => Ok(Perspective::Pm),
            "cfo" => Ok(Perspective::Cfo),
            "designer" => Ok(Perspective::Designer),
            other => Err(UnknownPerspective(other.to_string())),
        }
    }
}

/// Which optional sections render. Problem summary and actions always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityDecision {
    pub show_financial: bool,
    pub show_quant_evidence: bool,
    pub show_qual_evidence: bool,
    pub show_ab_tests: bool,
    pub show_metrics: bool,
    pub show_recommended_questions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerspectiveView {
    pub visibility: VisibilityDecision,
    pub banner: Banner,
}

pub fn banner(perspective: Perspective) -> Banner {
    match perspective {
        Perspective::Pm => Banner {
            title: "Product Manager View",
            subtitle: "The full picture: evidence, recommended actions, experiments and metrics to track.",
        },
        Perspective::Cfo => Banner {
            title: "CFO View",
            subtitle: "Financial impact, the quantitative evidence behind it and the metrics that move the business.",
        },
        Perspective::Designer => Banner {
            title: "Designer View",
            subtitle: "The user's voice: qualitative themes, recommended actions and experiments to validate them.",
        },
    }
}

/// Pure mapping from `(perspective, result)` to what renders.
///
/// Missing data always wins: financial impact is hidden whenever the payload lacks
/// it, and suggested questions only show for a non-empty list.
pub fn resolve(perspective: Perspective, result: &AnalysisResult) -> PerspectiveView {
    let has_financial = result.financial_impact.is_some();
    let has_questions = !result.suggested_questions().is_empty();

    let visibility = match perspective {
        Perspective::Pm => VisibilityDecision {
            show_financial: has_financial,
            show_quant_evidence: true,
            show_qual_evidence: true,
            show_ab_tests: true,
            show_metrics: true,
            show_recommended_questions: has_questions,
        },
        Perspective::Cfo => VisibilityDecision {
            show_financial: has_financial,
            show_quant_evidence: true,
            show_qual_evidence: false,
            show_ab_tests: false,
            show_metrics: true,
            show_recommended_questions: has_questions,
        },
        Perspective::Designer => VisibilityDecision {
            show_financial: false,
            show_quant_evidence: false,
            show_qual_evidence: true,
            show_ab_tests: true,
            show_metrics: false,
            show_recommended_questions: has_questions,
        },
    };

    PerspectiveView {
        visibility,
        banner: banner(perspective),
    }
}
