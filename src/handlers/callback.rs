use crate::BotState;
use std::error::Error;
use std::sync::Arc;
use teloxide::dispatching::DpHandlerDescription;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use crate::handlers::{refresh_message, render_status};
use crate::keyboard::{retry_keyboard, QuizAction};
use crate::quiz::{Advance, Phase, SubmitOutcome};
use crate::state::SharedSession;

pub fn recursive_callback_handler(
    state: Arc<BotState>,
) -> dptree::Handler<'static, DependencyMap, Result<(), Box<dyn Error + Send + Sync>>, DpHandlerDescription>
{
    Update::filter_callback_query()
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let state = state.clone();
            async move {
                handle_callback_query(bot, q, state).await
            }
        })
}

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (Some(message), Some(data)) = (query.message, query.data) else {
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;

    let Some(shared) = state.session(chat_id.0).await else {
        bot.answer_callback_query(query.id)
            .text("This quiz is no longer running. Use /scenarios to start another.")
            .await?;
        return Ok(());
    };

    let mut notice: Option<&str> = None;
    let mut submit = false;
    {
        let mut active = shared.lock().await;
        let action = QuizAction::parse(&data);
        let is_quiz_message = active.message_id == Some(message.id);

        match action {
            Some(QuizAction::Retry) => submit = true,
            Some(_) if !is_quiz_message => notice = Some("This message belongs to an older quiz."),
            Some(QuizAction::Select(index)) => {
                let option = active
                    .session
                    .current_question()
                    .option_at(index)
                    .map(str::to_string);
                match option {
                    Some(option) if active.session.select_option(&option) => {
                        refresh_message(&bot, chat_id, &active).await;
                    }
                    _ => notice = Some("That option can't be selected anymore."),
                }
            }
            Some(QuizAction::Next) => match active.session.advance() {
                Advance::Next(_) => refresh_message(&bot, chat_id, &active).await,
                Advance::Finished => {
                    refresh_message(&bot, chat_id, &active).await;
                    submit = true;
                }
                Advance::Rejected if active.session.phase() == Phase::Active => {
                    notice = Some("Select an option first.");
                }
                Advance::Rejected if active.session.phase().is_pending_submission() => {
                    notice = Some("Your answers are being submitted.");
                }
                Advance::Rejected => notice = Some("This quiz is already finished."),
            },
            Some(QuizAction::EndQuiz) => submit = true,
            None => notice = Some("Unknown action."),
        }
    }

    let mut answer = bot.answer_callback_query(query.id);
    if let Some(text) = notice {
        answer = answer.text(text);
    }
    answer.await?;

    if submit {
        submit_session(&bot, chat_id, &state, &shared).await?;
    }
    Ok(())
}

/// Submits the chat's session and reports the outcome. Safe to call from
/// both the countdown and a button press; only the first call submits.
pub async fn submit_session(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    shared: &SharedSession,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut active = shared.lock().await;
    let timed_out = active.session.phase() == Phase::TimedOut;
    match active.session.submit(state.api.as_ref()).await {
        Ok(SubmitOutcome::Submitted(result)) => {
            let session = &active.session;
            let text = format!(
                "{}✅ {} submitted!\nAnswered {} of {} questions.\n\n{}",
                if timed_out { "⏰ Time's up!\n" } else { "" },
                session.scenario().title,
                session.answers().len(),
                session.questions().len(),
                result.summary()
            );
            if let Some(message_id) = active.message_id {
                if let Err(e) = bot
                    .edit_message_text(chat_id, message_id, render_status(session))
                    .await
                {
                    log::debug!("Could not close quiz message in chat {}: {}", chat_id, e);
                }
            }
            drop(active);
            state.remove_session_if(chat_id.0, shared).await;
            bot.send_message(chat_id, text).await?;
        }
        Ok(SubmitOutcome::AlreadySubmitted) => {
            log::debug!("Ignoring repeated submission in chat {}", chat_id);
        }
        Err(e) if e.is_service_error() => {
            drop(active);
            bot.send_message(
                chat_id,
                format!("⚠️ Could not submit your answers: {}\nYour answers are kept, try again.", e),
            )
            .reply_markup(retry_keyboard())
            .await?;
        }
        Err(e) => {
            drop(active);
            log::error!("Submission in chat {} cannot be retried: {}", chat_id, e);
            bot.send_message(chat_id, format!("❌ Could not submit your answers: {}", e))
                .await?;
        }
    }
    Ok(())
}
