mod common;

use std::path::PathBuf;

use normate_core::{
    update, Effect, ErrorKind, Msg, Perspective, PollPhase, PollState, ResultsState, Role,
    SectionKind, FALLBACK_REPLY,
};
use pretty_assertions::assert_eq;

use common::{full_result, init_logging, sparse_result};

fn mounted(job_id: &str) -> ResultsState {
    let (state, effects) = update(ResultsState::new(job_id), Msg::Mounted);
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            job_id: job_id.to_string()
        }]
    );
    state
}

fn ready(result: normate_core::AnalysisResult) -> ResultsState {
    let state = mounted(&result.job_id.clone());
    let (state, effects) = update(state, Msg::PollFinished(Ok(Box::new(result))));
    assert!(effects.is_empty());
    state
}

fn progress(attempt: u32) -> Msg {
    Msg::PollProgress(PollState {
        phase: PollPhase::Loading,
        attempt,
        last_error: Some(ErrorKind::TransientNotReady),
    })
}

#[test]
fn mount_starts_polling_once() {
    init_logging();
    let state = mounted("job-1");
    let (state, effects) = update(state, Msg::Mounted);
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, PollPhase::Loading);
}

#[test]
fn progress_then_ready_composes_cfo_view() {
    init_logging();
    let state = mounted("job-1").with_perspective(Perspective::Cfo);
    let (state, _) = update(state, progress(1));
    let (mut state, _) = update(state, progress(2));
    assert_eq!(state.view().attempt, 2);
    assert!(state.consume_dirty());

    let (state, _) = update(state, Msg::PollFinished(Ok(Box::new(full_result()))));
    let view = state.view();
    assert_eq!(view.phase, PollPhase::Ready);
    assert_eq!(view.banner.map(|b| b.title), Some("CFO View"));
    assert!(view.sections.contains(&SectionKind::FinancialImpact));
    assert!(view.sections.contains(&SectionKind::QuantEvidence));
    assert!(view.sections.contains(&SectionKind::Metrics));
    assert!(!view.sections.contains(&SectionKind::QualEvidence));
    assert!(!view.sections.contains(&SectionKind::AbTests));
    assert!(view.can_export);
}

#[test]
fn perspective_change_recomposes_without_effects() {
    init_logging();
    let state = ready(full_result());
    let (state, effects) = update(state, Msg::PerspectiveSelected(Perspective::Designer));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.perspective, Perspective::Designer);
    assert!(!view.sections.contains(&SectionKind::FinancialImpact));
    assert!(view.sections.contains(&SectionKind::QualEvidence));
}

#[test]
fn analysis_failure_shows_error() {
    init_logging();
    let state = mounted("job-2");
    let (state, effects) = update(
        state,
        Msg::PollFinished(Err(ErrorKind::AnalysisFailed {
            reason: "boom".to_string(),
        })),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, PollPhase::Error);
    assert!(view.error_message.unwrap().contains("boom"));
    assert!(view.sections.is_empty());
    assert!(!view.can_export);
}

#[test]
fn unmount_cancels_and_ignores_late_updates() {
    init_logging();
    let state = mounted("job-3");
    let (state, effects) = update(state, Msg::Unmounted);
    assert_eq!(effects, vec![Effect::CancelPolling]);

    let before = state.view();
    let (state, _) = update(state, progress(5));
    let (state, _) = update(state, Msg::PollFinished(Ok(Box::new(full_result()))));
    let after = state.view();
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.attempt, before.attempt);
    assert!(after.sections.is_empty());
}

#[test]
fn export_is_single_flight_and_failure_raises_alert() {
    init_logging();
    let state = ready(full_result());
    let (state, effects) = update(state, Msg::ExportRequested);
    assert_eq!(
        effects,
        vec![Effect::ExportReport {
            job_id: "a1b2c3d4e5f6".to_string()
        }]
    );
    let (state, effects) = update(state, Msg::ExportRequested);
    assert!(effects.is_empty());
    assert!(state.view().export_in_progress);

    let (state, _) = update(state, Msg::ExportFinished(Err("capture failed".to_string())));
    let view = state.view();
    assert!(!view.export_in_progress);
    assert!(view.alert.is_some());
    // Report state is untouched by the failed export.
    assert_eq!(view.phase, PollPhase::Ready);
    assert!(!view.sections.is_empty());

    let (state, _) = update(state, Msg::AlertDismissed);
    assert!(state.view().alert.is_none());
}

#[test]
fn successful_export_records_path() {
    init_logging();
    let state = ready(full_result());
    let (state, _) = update(state, Msg::ExportRequested);
    let path = PathBuf::from("out/normate-report-a1b2c3d4e5f6.pdf");
    let (state, _) = update(state, Msg::ExportFinished(Ok(path.clone())));
    assert_eq!(state.view().last_export, Some(path));
    assert!(state.view().alert.is_none());
}

#[test]
fn export_before_ready_is_ignored() {
    init_logging();
    let state = mounted("job-4");
    let (_, effects) = update(state, Msg::ExportRequested);
    assert!(effects.is_empty());
}

#[test]
fn suggested_question_is_sent_once_even_if_open_reruns() {
    init_logging();
    let state = ready(full_result());
    let (state, effects) = update(state, Msg::SuggestedQuestionSelected(0));
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::SendChat { job_id, request } => {
            assert_eq!(job_id, "a1b2c3d4e5f6");
            assert_eq!(request.question, "Which segment drops off the most?");
        }
        other => panic!("unexpected effect {other:?}"),
    }

    let (state, _) = update(state, Msg::ChatReplied(Ok("Android users.".to_string())));
    let (state, effects) = update(
        state,
        Msg::ChatOpened {
            initial_question: Some("Which segment drops off the most?".to_string()),
        },
    );
    assert!(effects.is_empty());

    let chat = state.view().chat.unwrap();
    assert!(chat.open);
    assert_eq!(chat.messages.iter().filter(|m| m.role == Role::User).count(), 1);
}

#[test]
fn chat_failure_and_blank_sends() {
    init_logging();
    let state = ready(sparse_result());
    let (state, effects) = update(state, Msg::ChatOpened { initial_question: None });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::ChatSubmitted("   ".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.view().chat.unwrap().messages.len(), 1);

    let (state, effects) = update(state, Msg::ChatSubmitted("Why?".to_string()));
    assert_eq!(effects.len(), 1);
    let (state, effects) = update(state, Msg::ChatSubmitted("Again?".to_string()));
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::ChatReplied(Err("500".to_string())));
    let chat = state.view().chat.unwrap();
    assert_eq!(chat.messages.last().unwrap().content, FALLBACK_REPLY);
    assert!(!chat.in_flight);
    assert_eq!(state.view().phase, PollPhase::Ready);
}

#[test]
fn missing_suggested_question_index_does_nothing() {
    init_logging();
    let state = ready(sparse_result());
    let (state, effects) = update(state, Msg::SuggestedQuestionSelected(0));
    assert!(effects.is_empty());
    assert!(state.view().chat.is_none());
}

#[test]
fn unmount_discards_chat() {
    init_logging();
    let state = ready(full_result());
    let (state, _) = update(state, Msg::ChatOpened { initial_question: None });
    assert!(state.view().chat.is_some());
    let (state, effects) = update(state, Msg::Unmounted);
    assert!(effects.is_empty());
    assert!(state.view().chat.is_none());
}

#[test]
fn suggested_question_picked_while_in_flight_goes_out_after_the_reply() {
    init_logging();
    let state = ready(full_result());
    let (state, _) = update(state, Msg::ChatOpened { initial_question: None });
    let (state, effects) = update(state, Msg::ChatSubmitted("manual question".to_string()));
    assert_eq!(effects.len(), 1);

    let (state, effects) = update(state, Msg::SuggestedQuestionSelected(0));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::ChatReplied(Ok("First answer.".to_string())));
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::SendChat { request, .. } => {
            assert_eq!(request.question, "Which segment drops off the most?");
        }
        other => panic!("unexpected effect {other:?}"),
    }

    let (state, _) = update(state, Msg::ChatReplied(Ok("Android users.".to_string())));
    let (state, effects) = update(state, Msg::SuggestedQuestionSelected(0));
    assert!(effects.is_empty());

    let chat = state.view().chat.unwrap();
    let questions: Vec<_> = chat
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        questions,
        vec!["manual question", "Which segment drops off the most?"]
    );
}

#[test]
fn closed_panel_does_not_send() {
    init_logging();
    let state = ready(full_result());
    let (state, _) = update(state, Msg::ChatOpened { initial_question: None });
    let (mut state, _) = update(state, Msg::ChatClosed);
    state.consume_dirty();

    let (mut state, effects) = update(state, Msg::ChatSubmitted("Still there?".to_string()));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());

    let (state, _) = update(state, Msg::ChatOpened { initial_question: None });
    let (_, effects) = update(state, Msg::ChatSubmitted("Still there?".to_string()));
    assert_eq!(effects.len(), 1);
}
