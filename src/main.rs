use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;

use scenario_quiz_bot::{
    command_handler, recursive_callback_handler, BotState, Command, Config, HttpSimulatorApi,
    SystemClock,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    log::info!("Starting scenario quiz bot...");

    let config = Config::from_env()?;
    log::info!("Using simulator service at {}", config.api_url);

    // Token comes from TELOXIDE_TOKEN
    let bot = Bot::from_env();

    let api = HttpSimulatorApi::new(&config)?;
    let state = Arc::new(BotState::new(Arc::new(api), Arc::new(SystemClock)));

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<Command>().endpoint(
            |bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>| async move {
                command_handler(bot, msg, cmd, state.clone()).await
            },
        ))
        .branch(recursive_callback_handler(state.clone()));

    log::info!("Starting command dispatching...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
