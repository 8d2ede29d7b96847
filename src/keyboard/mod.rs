use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::types::Question;

pub const OPTION_PREFIX: &str = "opt:";
pub const NEXT: &str = "next";
pub const END_QUIZ: &str = "end_quiz";
pub const RETRY: &str = "retry";

/// What a button press on the quiz message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    Select(usize),
    Next,
    EndQuiz,
    Retry,
}

impl QuizAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            NEXT => Some(QuizAction::Next),
            END_QUIZ => Some(QuizAction::EndQuiz),
            RETRY => Some(QuizAction::Retry),
            _ => data
                .strip_prefix(OPTION_PREFIX)
                .and_then(|i| i.parse().ok())
                .map(QuizAction::Select),
        }
    }
}

pub fn create_keyboard(
    question: &Question,
    selected_answer: Option<&str>,
    is_last: bool,
    show_end_button: bool,
) -> InlineKeyboardMarkup {
    // Option text can exceed the 64 byte callback limit, so buttons carry
    // the option index instead.
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let text = match selected_answer {
                Some(selected) if selected == option => format!("👉 {}", option),
                _ => option.clone(),
            };
            vec![InlineKeyboardButton::callback(text, format!("{}{}", OPTION_PREFIX, i))]
        })
        .collect();

    let advance_label = if is_last { "📨 Submit" } else { "➡️ Next Question" };
    keyboard.push(vec![InlineKeyboardButton::callback(advance_label.to_string(), NEXT.to_string())]);

    if show_end_button {
        keyboard.push(vec![InlineKeyboardButton::callback("🛑 End Quiz".to_string(), END_QUIZ.to_string())]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn retry_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔁 Retry submission".to_string(),
        RETRY.to_string(),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_callback_data() {
        assert_eq!(QuizAction::parse("opt:2"), Some(QuizAction::Select(2)));
        assert_eq!(QuizAction::parse("next"), Some(QuizAction::Next));
        assert_eq!(QuizAction::parse("end_quiz"), Some(QuizAction::EndQuiz));
        assert_eq!(QuizAction::parse("retry"), Some(QuizAction::Retry));
        assert_eq!(QuizAction::parse("opt:x"), None);
        assert_eq!(QuizAction::parse("Paris"), None);
    }
}
