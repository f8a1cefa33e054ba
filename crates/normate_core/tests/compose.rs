mod common;

use normate_core::{compose, compose_kinds, Perspective, Section, SectionKind};
use pretty_assertions::assert_eq;

use common::{full_result, sparse_result};

#[test]
fn pm_composition_order() {
    assert_eq!(
        compose_kinds(&full_result(), Perspective::Pm),
        vec![
            SectionKind::ProblemSummary,
            SectionKind::FinancialImpact,
            SectionKind::QuantEvidence,
            SectionKind::QualEvidence,
            SectionKind::Actions,
            SectionKind::AbTests,
            SectionKind::Metrics,
            SectionKind::SuggestedQuestions,
        ]
    );
}

#[test]
fn cfo_composition_includes_money_and_numbers_only() {
    let kinds = compose_kinds(&full_result(), Perspective::Cfo);
    assert_eq!(
        kinds,
        vec![
            SectionKind::ProblemSummary,
            SectionKind::FinancialImpact,
            SectionKind::QuantEvidence,
            SectionKind::Actions,
            SectionKind::Metrics,
            SectionKind::SuggestedQuestions,
        ]
    );
}

#[test]
fn designer_composition_without_optional_sections() {
    assert_eq!(
        compose_kinds(&sparse_result(), Perspective::Designer),
        vec![
            SectionKind::ProblemSummary,
            SectionKind::QualEvidence,
            SectionKind::Actions,
            SectionKind::AbTests,
        ]
    );
}

#[test]
fn problem_summary_and_actions_always_render() {
    for result in [full_result(), sparse_result()] {
        for perspective in Perspective::ALL {
            let kinds = compose_kinds(&result, perspective);
            assert!(kinds.contains(&SectionKind::ProblemSummary));
            assert!(kinds.contains(&SectionKind::Actions));
        }
    }
}

#[test]
fn sections_borrow_the_matching_slices() {
    let result = full_result();
    let sections = compose(&result, Perspective::Pm);

    match sections[0] {
        Section::ProblemSummary(text) => assert_eq!(text, result.problem_summary),
        other => panic!("unexpected first section {other:?}"),
    }
    let questions = sections
        .iter()
        .find_map(|s| match s {
            Section::SuggestedQuestions(q) => Some(*q),
            _ => None,
        })
        .expect("suggested questions section");
    assert_eq!(questions, result.suggested_questions());
}

#[test]
fn switching_perspective_recomposes_from_the_same_result() {
    let result = full_result();
    let before = result.clone();
    let _ = compose(&result, Perspective::Cfo);
    let _ = compose(&result, Perspective::Designer);
    assert_eq!(result, before);
}
