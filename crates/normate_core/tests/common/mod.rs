#![allow(dead_code)]

use std::sync::Once;

use normate_core::{
    AbTest, AnalysisResult, Direction, FinancialImpact, Level, QualEvidence, QuantEvidence,
    RecommendedAction, SentimentLabel, TrackedMetric,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(normate_logging::initialize_for_tests);
}

/// Fully populated result, including the optional sections.
pub fn full_result() -> AnalysisResult {
    AnalysisResult {
        job_id: "a1b2c3d4e5f6".to_string(),
        problem_summary: "Mobile users abandon onboarding at the permissions step.".to_string(),
        quant_evidence: vec![QuantEvidence {
            metric: "Onboarding completion".to_string(),
            value: "41.2%".to_string(),
            change: Some("-12% vs previous period".to_string()),
            direction: Some(Direction::Down),
        }],
        qual_evidence: vec![QualEvidence {
            theme: "Permission anxiety".to_string(),
            sentiment: -0.54,
            sentiment_label: SentimentLabel::Negative,
            quotes: vec!["Why does it need my contacts?".to_string()],
        }],
        actions: vec![RecommendedAction {
            title: "Defer the contacts permission".to_string(),
            description: "Ask for contacts only when the user first invites someone.".to_string(),
            evidence: "Qual: 'Why does it need my contacts?' + Quant: completion -12%".to_string(),
            impact: Level::High,
            difficulty: Level::Low,
            estimated_effect: "+8-12% onboarding completion".to_string(),
        }],
        ab_tests: vec![AbTest {
            name: "Deferred permissions".to_string(),
            control: "Permissions on step 2".to_string(),
            treatment: "Permissions on first invite".to_string(),
            metric: "Onboarding completion".to_string(),
            duration: "2 weeks".to_string(),
        }],
        metrics: vec![TrackedMetric {
            name: "Onboarding completion".to_string(),
            current: "41.2%".to_string(),
            target: ">50% within 4 weeks".to_string(),
        }],
        financial_impact: Some(FinancialImpact {
            summary: Some("Roughly $18k MRR at risk from onboarding drop-off.".to_string()),
            arpu: Some(12.5),
            ..FinancialImpact::default()
        }),
        suggested_questions: Some(vec![
            "Which segment drops off the most?".to_string(),
            "How confident is the revenue estimate?".to_string(),
        ]),
        generated_at: Some("2026-10-18T09:30:00".to_string()),
    }
}

/// Same result with both optional sections absent.
pub fn sparse_result() -> AnalysisResult {
    AnalysisResult {
        financial_impact: None,
        suggested_questions: None,
        ..full_result()
    }
}
