use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]

pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "List the available scenarios")]
    Scenarios,
    #[command(description = "Start a timed scenario, e.g. /scenario onboarding")]
    Scenario(String),
    #[command(description = "Show the current question and time left")]
    Status,
    #[command(description = "Show your past simulator results")]
    Results,
    #[command(description = "Abandon the running scenario")]
    Cancel,
    #[command(description = "Show help message")]
    Help,
}
