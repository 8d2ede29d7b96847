use std::sync::{Arc, Weak};

use teloxide::prelude::*;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::handlers::{refresh_message, submit_session};
use crate::quiz::{Tick, TimerHandle};
use crate::state::{ActiveSession, BotState, SharedSession};

const REFRESH_EVERY_SECS: u64 = 15;

/// Spawns the session's countdown and hands the session the handle that
/// aborts it.
pub async fn start_countdown(
    bot: Bot,
    chat_id: ChatId,
    state: Arc<BotState>,
    shared: &SharedSession,
) -> JoinHandle<()> {
    let task = tokio::spawn(run_countdown(bot, chat_id, state, Arc::downgrade(shared)));
    shared
        .lock()
        .await
        .session
        .attach_timer(TimerHandle::from_task(task.abort_handle()));
    task
}

/// Ticks the session once per period until it expires or goes away. The
/// task is aborted through the session's timer handle on every other exit.
pub async fn run_countdown(
    bot: Bot,
    chat_id: ChatId,
    state: Arc<BotState>,
    session: Weak<Mutex<ActiveSession>>,
) {
    let mut ticker = interval(state.tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(shared) = session.upgrade() else {
            break;
        };

        let mut active = shared.lock().await;
        match active.session.tick() {
            Tick::Running(left) => {
                if left % REFRESH_EVERY_SECS == 0 {
                    refresh_message(&bot, chat_id, &active).await;
                }
            }
            Tick::Expired => {
                drop(active);
                // A successful submit aborts this task, so the submission
                // runs on its own.
                let state = state.clone();
                let bot = bot.clone();
                tokio::spawn(async move {
                    if let Err(e) = submit_session(&bot, chat_id, &state, &shared).await {
                        log::error!("Failed to submit after timeout in chat {}: {}", chat_id, e);
                    }
                });
                break;
            }
            Tick::Idle => break,
        }
    }

    log::debug!("Countdown for chat {} stopped", chat_id);
}
