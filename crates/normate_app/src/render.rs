use chrono::NaiveDateTime;
use normate_core::{
    ChatMessage, Direction, HistoryEntry, Level, PollPhase, ReportViewModel, ResultsState, Role,
    Section, SentimentLabel,
};

const RULE: &str = "----------------------------------------";

pub fn status_line(view: &ReportViewModel) -> String {
    match view.phase {
        PollPhase::Loading => format!(
            "Job {}: analysis in progress (check {})",
            view.job_id, view.attempt
        ),
        PollPhase::Ready => {
            let mut line = format!("Job {}: results ready [{}]", view.job_id, view.perspective);
            if view.export_in_progress {
                line.push_str(" | exporting...");
            }
            line
        }
        PollPhase::Error => format!(
            "Job {}: {}",
            view.job_id,
            view.error_message.as_deref().unwrap_or("results unavailable")
        ),
    }
}

/// Full report text for the state's current perspective. Empty until ready.
pub fn render_report(state: &ResultsState) -> Vec<String> {
    let view = state.view();
    let Some(banner) = view.banner else {
        return Vec::new();
    };

    let mut lines = vec![
        RULE.to_string(),
        banner.title.to_string(),
        banner.subtitle.to_string(),
        RULE.to_string(),
    ];
    for section in state.sections() {
        lines.push(String::new());
        lines.push(format!("## {}", section.kind().heading()));
        render_section(&section, &mut lines);
    }
    lines
}

fn render_section(section: &Section<'_>, lines: &mut Vec<String>) {
    match section {
        Section::ProblemSummary(summary) => lines.push(summary.to_string()),
        Section::FinancialImpact(impact) => {
            if let Some(summary) = &impact.summary {
                lines.push(summary.clone());
            }
            if let Some(arpu) = impact.arpu {
                lines.push(format!("ARPU: {arpu:.2}"));
            }
            if let Some(risk) = &impact.revenue_at_risk {
                lines.push(format!("Revenue at risk: {risk}"));
            }
            if let Some(recovery) = &impact.projected_recovery {
                lines.push(format!("Projected recovery: {recovery}"));
            }
            for assumption in &impact.assumptions {
                lines.push(format!("  * {assumption}"));
            }
        }
        Section::QuantEvidence(items) => {
            for item in items.iter() {
                let mut line = format!("- {}: {}", item.metric, item.value);
                if let Some(change) = &item.change {
                    line.push_str(&format!(" ({}{change})", direction_marker(item.direction)));
                }
                lines.push(line);
            }
        }
        Section::QualEvidence(items) => {
            for item in items.iter() {
                lines.push(format!(
                    "- {} [{}, {:+.2}]",
                    item.theme,
                    sentiment_label(item.sentiment_label),
                    item.sentiment
                ));
                for quote in &item.quotes {
                    lines.push(format!("    \"{quote}\""));
                }
            }
        }
        Section::Actions(actions) => {
            for (index, action) in actions.iter().enumerate() {
                lines.push(format!(
                    "{}. {} (impact {}, difficulty {})",
                    index + 1,
                    action.title,
                    level(action.impact),
                    level(action.difficulty)
                ));
                lines.push(format!("   {}", action.description));
                if !action.estimated_effect.is_empty() {
                    lines.push(format!("   Expected: {}", action.estimated_effect));
                }
            }
        }
        Section::AbTests(tests) => {
            for test in tests.iter() {
                lines.push(format!("- {} ({}, {})", test.name, test.metric, test.duration));
                lines.push(format!("   control: {}", test.control));
                lines.push(format!("   treatment: {}", test.treatment));
            }
        }
        Section::Metrics(metrics) => {
            for metric in metrics.iter() {
                lines.push(format!(
                    "- {}: {} -> {}",
                    metric.name, metric.current, metric.target
                ));
            }
        }
        Section::SuggestedQuestions(questions) => {
            for (index, question) in questions.iter().enumerate() {
                lines.push(format!("[{}] {question}", index + 1));
            }
        }
    }
}

pub fn render_chat_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{speaker}> {}", message.content)
}

pub fn render_history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No analyses yet.".to_string()];
    }
    entries
        .iter()
        .map(|entry| {
            let created = entry
                .created_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{:<14} {:<10} {:<16} {}",
                entry.job_id,
                entry.status.as_str(),
                created,
                entry.research_question.as_deref().unwrap_or("")
            )
        })
        .collect()
}

/// Backend timestamps are naive ISO-8601 in UTC; show them to the minute.
fn format_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn direction_marker(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::Up) => "^ ",
        Some(Direction::Down) => "v ",
        Some(Direction::Flat) => "= ",
        None => "",
    }
}

fn sentiment_label(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "positive",
        SentimentLabel::Negative => "negative",
        SentimentLabel::Neutral => "neutral",
        SentimentLabel::Mixed => "mixed",
    }
}

fn level(level: Level) -> &'static str {
    match level {
        Level::High => "high",
        Level::Medium => "medium",
        Level::Low => "low",
    }
}
