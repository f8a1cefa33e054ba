use std::sync::Arc;

use crate::error::ErrorKind;
use crate::poll::{PollPhase, PollState};
use crate::{Effect, Msg, ResultsState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ResultsState, msg: Msg) -> (ResultsState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.is_polling() || state.poll().is_terminal() {
                Vec::new()
            } else {
                state.set_polling(true);
                state.set_poll(PollState::loading());
                state.mark_dirty();
                vec![Effect::StartPolling {
                    job_id: state.job_id().to_string(),
                }]
            }
        }
        Msg::Unmounted => {
            let was_polling = state.is_polling();
            state.set_polling(false);
            state.discard_chat();
            state.mark_dirty();
            if was_polling {
                vec![Effect::CancelPolling]
            } else {
                Vec::new()
            }
        }
        Msg::PollProgress(poll) => {
            // Updates after cancel or after a terminal state are dropped.
            if state.is_polling() && poll.phase == PollPhase::Loading {
                state.set_poll(poll);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PollFinished(outcome) => {
            if state.is_polling() {
                state.set_polling(false);
                let mut poll = state.poll().clone();
                match outcome {
                    Ok(result) => {
                        poll.phase = PollPhase::Ready;
                        poll.last_error = None;
                        state.set_result(Arc::from(result));
                    }
                    Err(kind) => {
                        poll.phase = PollPhase::Error;
                        poll.last_error = Some(kind);
                    }
                }
                state.set_poll(poll);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PerspectiveSelected(perspective) => {
            if perspective != state.perspective() {
                state.set_perspective(perspective);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ExportRequested => {
            if state.is_ready() && !state.export_in_progress() {
                state.set_export_in_progress(true);
                state.mark_dirty();
                vec![Effect::ExportReport {
                    job_id: state.job_id().to_string(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::ExportFinished(outcome) => {
            if state.export_in_progress() {
                state.set_export_in_progress(false);
                match outcome {
                    Ok(path) => state.set_last_export(path),
                    Err(message) => {
                        let kind = ErrorKind::ExportFailed { message };
                        state.set_alert(Some(kind.user_message()));
                    }
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ChatOpened { initial_question } => open_chat(&mut state, initial_question),
        Msg::SuggestedQuestionSelected(index) => {
            let question = state
                .result()
                .and_then(|r| r.suggested_questions().get(index).cloned());
            match question {
                Some(question) => open_chat(&mut state, Some(question)),
                None => Vec::new(),
            }
        }
        Msg::ChatSubmitted(text) => {
            if !state.is_chat_open() {
                return (state, Vec::new());
            }
            let job_id = state.job_id().to_string();
            match state.chat_mut().map(|chat| chat.begin_send(&text)) {
                Some(Ok(request)) => {
                    state.mark_dirty();
                    vec![Effect::SendChat { job_id, request }]
                }
                _ => Vec::new(),
            }
        }
        Msg::ChatReplied(reply) => {
            let job_id = state.job_id().to_string();
            let mut effects = Vec::new();
            if let Some(chat) = state.chat_mut() {
                if chat.complete(reply) {
                    if let Some(request) = chat.take_queued() {
                        effects.push(Effect::SendChat { job_id, request });
                    }
                    state.mark_dirty();
                }
            }
            effects
        }
        Msg::ChatClosed => {
            if state.is_chat_open() {
                state.set_chat_open(false);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AlertDismissed => {
            if state.alert().is_some() {
                state.set_alert(None);
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn open_chat(state: &mut ResultsState, initial_question: Option<String>) -> Vec<Effect> {
    if !state.is_ready() {
        return Vec::new();
    }
    let job_id = state.job_id().to_string();
    let request = match state.ensure_chat() {
        Some(chat) => chat.take_initial_question(initial_question.as_deref()),
        None => return Vec::new(),
    };
    state.set_chat_open(true);
    state.mark_dirty();
    request
        .map(|request| vec![Effect::SendChat { job_id, request }])
        .unwrap_or_default()
}
