use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use normate_core::{update, Msg, Perspective, PollPhase, PollPolicy, ReportViewModel, ResultsState};
use normate_engine::{ApiClient, DocumentExporter, RegionCapture};
use normate_logging::normate_debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::effects::EffectRunner;
use crate::render;

const HELP: &str = "commands: p <pm|cfo|designer>, show, export, chat, ask <question>, \
suggest <n>, close, ok, help, quit";

/// Drives one results view: messages in, effects out, text rendered on change.
pub struct ResultsApp {
    state: ResultsState,
    runner: EffectRunner,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    rendered_perspective: Option<Perspective>,
    last_status: Option<String>,
    last_alert: Option<String>,
    last_export: Option<PathBuf>,
    printed_messages: usize,
}

impl ResultsApp {
    pub fn new(
        job_id: &str,
        perspective: Perspective,
        client: Arc<dyn ApiClient>,
        policy: PollPolicy,
        exporter: DocumentExporter,
        capture: Option<Arc<dyn RegionCapture>>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            state: ResultsState::new(job_id).with_perspective(perspective),
            runner: EffectRunner::new(client, policy, exporter, capture, msg_tx),
            msg_rx,
            rendered_perspective: None,
            last_status: None,
            last_alert: None,
            last_export: None,
            printed_messages: 0,
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            let view = self.state.view();
            self.render(&view);
        }
    }

    /// Process messages until polling reaches a terminal phase.
    pub async fn wait_for_results(&mut self) -> Result<()> {
        self.dispatch(Msg::Mounted);
        while self.state.poll().phase == PollPhase::Loading {
            let msg = self
                .msg_rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("result polling stopped unexpectedly"))?;
            self.dispatch(msg);
        }
        match self.state.view().error_message {
            Some(message) => bail!(message),
            None => Ok(()),
        }
    }

    /// Request one export and wait for it to finish.
    pub async fn export(&mut self) -> Result<PathBuf> {
        if !self.state.view().can_export {
            bail!("the report is not ready to export");
        }
        self.dispatch(Msg::ExportRequested);
        while self.state.view().export_in_progress {
            let msg = self
                .msg_rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("export stopped unexpectedly"))?;
            self.dispatch(msg);
        }
        if let Some(alert) = self.state.view().alert {
            self.dispatch(Msg::AlertDismissed);
            bail!(alert);
        }
        self.last_export
            .clone()
            .ok_or_else(|| anyhow!("export finished without a file"))
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run_interactive(&mut self) -> Result<()> {
        println!("{HELP}");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                msg = self.msg_rx.recv() => match msg {
                    Some(msg) => self.dispatch(msg),
                    None => return Ok(()),
                },
                line = lines.next_line() => {
                    let Some(line) = line? else { return Ok(()) };
                    match parse_input(&line, self.state.view().chat.as_ref().is_some_and(|c| c.open)) {
                        Input::Msgs(msgs) => {
                            for msg in msgs {
                                self.dispatch(msg);
                            }
                        }
                        Input::Show => {
                            self.rendered_perspective = None;
                            let view = self.state.view();
                            self.render(&view);
                        }
                        Input::Help => println!("{HELP}"),
                        Input::Quit => return Ok(()),
                        Input::Empty => {}
                        Input::Unknown(text) => println!("unknown command '{text}'; {HELP}"),
                    }
                }
            }
        }
    }

    /// Tear the view down: cancels polling and discards the chat.
    pub fn close(mut self) {
        self.dispatch(Msg::Unmounted);
    }

    fn render(&mut self, view: &ReportViewModel) {
        let status = render::status_line(view);
        if self.last_status.as_ref() != Some(&status) {
            eprintln!("{status}");
            self.last_status = Some(status);
        }

        if view.phase == PollPhase::Ready && self.rendered_perspective != Some(view.perspective) {
            for line in render::render_report(&self.state) {
                println!("{line}");
            }
            self.rendered_perspective = Some(view.perspective);
        }

        if view.last_export != self.last_export {
            if let Some(path) = &view.last_export {
                println!("Saved {}", path.display());
            }
            self.last_export = view.last_export.clone();
        }

        if view.alert != self.last_alert {
            if let Some(alert) = &view.alert {
                eprintln!("! {alert}");
            }
            self.last_alert = view.alert.clone();
        }

        match &view.chat {
            Some(chat) => {
                for message in chat.messages.iter().skip(self.printed_messages) {
                    println!("{}", render::render_chat_message(message));
                }
                self.printed_messages = chat.messages.len();
                if chat.in_flight {
                    normate_debug!("Waiting for chat reply");
                }
            }
            None => self.printed_messages = 0,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    Msgs(Vec<Msg>),
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str, chat_open: bool) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "p" | "perspective" => match rest.parse::<Perspective>() {
            Ok(perspective) => Input::Msgs(vec![Msg::PerspectiveSelected(perspective)]),
            Err(err) => Input::Unknown(err.to_string()),
        },
        "show" => Input::Show,
        "export" => Input::Msgs(vec![Msg::ExportRequested]),
        "chat" => Input::Msgs(vec![Msg::ChatOpened {
            initial_question: None,
        }]),
        "ask" if !rest.is_empty() => Input::Msgs(vec![
            Msg::ChatOpened {
                initial_question: None,
            },
            Msg::ChatSubmitted(rest.to_string()),
        ]),
        "suggest" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Msgs(vec![Msg::SuggestedQuestionSelected(n - 1)]),
            _ => Input::Unknown(line.to_string()),
        },
        "close" => Input::Msgs(vec![Msg::ChatClosed]),
        "ok" | "dismiss" => Input::Msgs(vec![Msg::AlertDismissed]),
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ if chat_open => Input::Msgs(vec![Msg::ChatSubmitted(line.to_string())]),
        _ => Input::Unknown(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn perspective_command_selects_perspective() {
        assert_eq!(
            parse_input("p Designer", false),
            Input::Msgs(vec![Msg::PerspectiveSelected(Perspective::Designer)])
        );
    }

    #[test]
    fn ask_opens_chat_before_submitting() {
        assert_eq!(
            parse_input("ask  Why did churn rise? ", false),
            Input::Msgs(vec![
                Msg::ChatOpened {
                    initial_question: None
                },
                Msg::ChatSubmitted("Why did churn rise?".to_string()),
            ])
        );
    }

    #[test]
    fn suggestions_are_one_based() {
        assert_eq!(
            parse_input("suggest 2", false),
            Input::Msgs(vec![Msg::SuggestedQuestionSelected(1)])
        );
        assert_eq!(
            parse_input("suggest 0", false),
            Input::Unknown("suggest 0".to_string())
        );
    }

    #[test]
    fn free_text_is_a_question_only_while_chat_is_open() {
        assert_eq!(
            parse_input("what about pricing?", true),
            Input::Msgs(vec![Msg::ChatSubmitted("what about pricing?".to_string())])
        );
        assert_eq!(
            parse_input("what about pricing?", false),
            Input::Unknown("what about pricing?".to_string())
        );
    }
}
