use crate::{BotState, Command};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::handlers::*;
use crate::quiz::load_session;
use crate::state::ActiveSession;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "
                \n 🧭 Use /scenarios to see the workplace scenarios you can practice.
                \n ⏱️ Use /scenario <id> to start one. Every scenario is timed and your answers are submitted when you finish or the time runs out.
                \n 📊 Use /results to review your past attempts.
                \n 🛑 Use /cancel to abandon a running scenario.
                \n ❓ Use /help for additional guidance.
                "
            )
            .await?;
        }
        Command::Scenarios => match state.api.list_scenarios().await {
            Ok(scenarios) => {
                bot.send_message(msg.chat.id, render_scenarios(&scenarios)).await?;
            }
            Err(e) => {
                log::warn!("Failed to list scenarios: {}", e);
                bot.send_message(msg.chat.id, "❌ Could not load scenarios. Try /scenarios again in a moment.")
                    .await?;
            }
        },
        Command::Scenario(scenario_id) => {
            let scenario_id = scenario_id.trim();
            if scenario_id.is_empty() {
                bot.send_message(msg.chat.id, "Usage: /scenario <id>. Use /scenarios to see the ids.")
                    .await?;
            } else {
                start_scenario(bot, msg.chat.id, scenario_id, state).await?;
            }
        }
        Command::Status => match state.session(msg.chat.id.0).await {
            Some(shared) => {
                let text = render_status(&shared.lock().await.session);
                bot.send_message(msg.chat.id, text).await?;
            }
            None => {
                bot.send_message(msg.chat.id, "No scenario is running. Use /scenarios to pick one.")
                    .await?;
            }
        },
        Command::Results => match state.api.results().await {
            Ok(results) => {
                bot.send_message(msg.chat.id, render_results(&results)).await?;
            }
            Err(e) => {
                log::warn!("Failed to fetch results: {}", e);
                bot.send_message(msg.chat.id, "❌ Could not load your results. Try /results again in a moment.")
                    .await?;
            }
        },
        Command::Cancel => match state.remove_session(msg.chat.id.0).await {
            Some(shared) => {
                let mut active = shared.lock().await;
                active.session.stop_timer();
                log::info!(
                    "Chat {} abandoned scenario {}",
                    msg.chat.id,
                    active.session.scenario().id
                );
                bot.send_message(msg.chat.id, "Scenario abandoned. Nothing was submitted.")
                    .await?;
            }
            None => {
                bot.send_message(msg.chat.id, "No scenario is running.").await?;
            }
        },
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

// Loads the scenario, shows the first question and starts its countdown.
async fn start_scenario(
    bot: Bot,
    chat_id: ChatId,
    scenario_id: &str,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let session = match load_session(state.api.as_ref(), scenario_id, state.clock.clone()).await {
        Ok(session) => session,
        Err(e) => {
            log::warn!("Failed to load scenario {}: {}", scenario_id, e);
            bot.send_message(
                chat_id,
                format!("❌ Could not load scenario {}: {}\nTry /scenario {} again.", scenario_id, e, scenario_id),
            )
            .await?;
            return Ok(());
        }
    };

    let sent_message = bot
        .send_message(chat_id, render_question(&session))
        .reply_markup(render_keyboard(&session))
        .await?;

    let (shared, previous) = state
        .insert_session(
            chat_id.0,
            ActiveSession {
                session,
                message_id: Some(sent_message.id),
            },
        )
        .await;

    if let Some(previous) = previous {
        previous.lock().await.session.stop_timer();
        log::info!("Replaced the running scenario in chat {}", chat_id);
    }

    log::info!("Chat {} started scenario {}", chat_id, scenario_id);
    start_countdown(bot, chat_id, state.clone(), &shared).await;

    Ok(())
}
