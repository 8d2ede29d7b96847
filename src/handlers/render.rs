use serde_json::Value;
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use crate::keyboard::create_keyboard;
use crate::quiz::{Phase, QuizSession};
use crate::state::ActiveSession;
use crate::types::ScenarioSummary;

// Telegram caps messages at 4096 characters.
const MAX_MESSAGE_CHARS: usize = 3500;

pub fn render_question(session: &QuizSession) -> String {
    let question = session.current_question();
    let mut text = format!(
        "{}\n⏱️ {}  |  {}\n\n{}",
        session.scenario().title,
        session.format_remaining(),
        session.progress(),
        question.question_text
    );
    if let Some(hint) = &question.hint {
        text.push_str(&format!("\n\n💡 Hint: {}", hint));
    }
    text
}

pub fn render_keyboard(session: &QuizSession) -> InlineKeyboardMarkup {
    create_keyboard(
        session.current_question(),
        session.selected(),
        session.is_last_question(),
        true,
    )
}

pub fn render_status(session: &QuizSession) -> String {
    match session.phase() {
        Phase::Active => format!(
            "{}\n\nStarted at {} UTC. Answered so far: {}",
            render_question(session),
            session.started_at().format("%H:%M:%S"),
            session.answers().len()
        ),
        Phase::TimedOut | Phase::Completed => format!(
            "{}: {} answers are waiting to be submitted.",
            session.scenario().title,
            session.answers().len()
        ),
        Phase::Submitted => format!("{} has been submitted.", session.scenario().title),
    }
}

pub fn render_scenarios(scenarios: &[ScenarioSummary]) -> String {
    if scenarios.is_empty() {
        return "No scenarios are available right now.".to_string();
    }
    let lines = scenarios
        .iter()
        .map(|s| {
            let mut entry = format!("{} {} ({})", s.difficulty_marker(), s.title, s.scenario_id);
            if !s.description.trim().is_empty() {
                entry.push_str(&format!("\n{}", s.description.trim()));
            }
            entry.push_str(&format!(
                "\n📝 {} questions  ⏱️ {} min\n/scenario {}",
                s.total_questions, s.time_limit, s.scenario_id
            ));
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("🧭 Day 0 Simulator\n\n{}", lines)
}

pub fn render_results(results: &Value) -> String {
    match results {
        Value::Array(items) if items.is_empty() => "You have no simulator results yet.".to_string(),
        Value::Array(items) => {
            let lines = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let scenario = item
                        .get("scenario_id")
                        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                        .unwrap_or_else(|| "?".to_string());
                    match item.get("score") {
                        Some(score) => format!("{}. {} - score {}", i + 1, scenario, score),
                        None => format!("{}. {}", i + 1, scenario),
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            truncate(format!("📊 Your results:\n\n{}", lines))
        }
        other => truncate(format!(
            "📊 Your results:\n\n{}",
            serde_json::to_string_pretty(other).unwrap_or_default()
        )),
    }
}

fn truncate(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_MESSAGE_CHARS) {
        text.truncate(cut);
        text.push('…');
    }
    text
}

/// Redraws the quiz message in place. Failures are only logged; the next
/// refresh will try again.
pub async fn refresh_message(bot: &Bot, chat_id: ChatId, active: &ActiveSession) {
    let Some(message_id) = active.message_id else {
        return;
    };
    let session = &active.session;
    let result = if session.phase() == Phase::Active {
        bot.edit_message_text(chat_id, message_id, render_question(session))
            .reply_markup(render_keyboard(session))
            .await
    } else {
        bot.edit_message_text(chat_id, message_id, render_status(session))
            .await
    };
    if let Err(e) = result {
        log::debug!("Could not refresh quiz message in chat {}: {}", chat_id, e);
    }
}
