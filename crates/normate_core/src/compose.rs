//! Ordered section list for a completed result.

use crate::model::{
    AbTest, AnalysisResult, FinancialImpact, QualEvidence, QuantEvidence, RecommendedAction,
    TrackedMetric,
};
use crate::perspective::{resolve, Perspective};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    ProblemSummary,
    FinancialImpact,
    QuantEvidence,
    QualEvidence,
    Actions,
    AbTests,
    Metrics,
    SuggestedQuestions,
}

impl SectionKind {
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::ProblemSummary => "Problem Summary",
            SectionKind::FinancialImpact => "Financial Impact",
            SectionKind::QuantEvidence => "Quantitative Evidence",
            SectionKind::QualEvidence => "Qualitative Evidence",
            SectionKind::Actions => "Recommended Actions",
            SectionKind::AbTests => "A/B Tests",
            SectionKind::Metrics => "Metrics to Track",
            SectionKind::SuggestedQuestions => "Suggested Questions",
        }
    }
}

/// One renderable section: its kind plus the slice of the result it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section<'a> {
    ProblemSummary(&'a str),
    FinancialImpact(&'a FinancialImpact),
    QuantEvidence(&'a [QuantEvidence]),
    QualEvidence(&'a [QualEvidence]),
    Actions(&'a [RecommendedAction]),
    AbTests(&'a [AbTest]),
    Metrics(&'a [TrackedMetric]),
    SuggestedQuestions(&'a [String]),
}

impl Section<'_> {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::ProblemSummary(_) => SectionKind::ProblemSummary,
            Section::FinancialImpact(_) => SectionKind::FinancialImpact,
            Section::QuantEvidence(_) => SectionKind::QuantEvidence,
            Section::QualEvidence(_) => SectionKind::QualEvidence,
            Section::Actions(_) => SectionKind::Actions,
            Section::AbTests(_) => SectionKind::AbTests,
            Section::Metrics(_) => SectionKind::Metrics,
            Section::SuggestedQuestions(_) => SectionKind::SuggestedQuestions,
        }
    }
}

/// Compose the visible sections for `perspective`, in display order.
pub fn compose(result: &AnalysisResult, perspective: Perspective) -> Vec<Section<'_>> {
    let visibility = resolve(perspective, result).visibility;
    let mut sections = Vec::with_capacity(8);

    sections.push(Section::ProblemSummary(&result.problem_summary));
    if visibility.show_financial {
        if let Some(impact) = result.financial_impact.as_ref() {
            sections.push(Section::FinancialImpact(impact));
        }
    }
    if visibility.show_quant_evidence {
        sections.push(Section::QuantEvidence(&result.quant_evidence));
    }
    if visibility.show_qual_evidence {
        sections.push(Section::QualEvidence(&result.qual_evidence));
    }
    sections.push(Section::Actions(&result.actions));
    if visibility.show_ab_tests {
        sections.push(Section::AbTests(&result.ab_tests));
    }
    if visibility.show_metrics {
        sections.push(Section::Metrics(&result.metrics));
    }
    if visibility.show_recommended_questions {
        sections.push(Section::SuggestedQuestions(result.suggested_questions()));
    }

    sections
}

/// Kinds only, for callers that do not need the payload slices.
pub fn compose_kinds(result: &AnalysisResult, perspective: Perspective) -> Vec<SectionKind> {
    compose(result, perspective)
        .iter()
        .map(Section::kind)
        .collect()
}
