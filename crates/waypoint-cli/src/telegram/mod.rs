//! Telegram front end: the `serve` command.
//!
//! Runs the update dispatcher and a background loop that sweeps for due and
//! overdue deadlines. Both share one [`Coach`] and deliver notifications
//! through a [`TelegramSink`].

mod handlers;
mod keyboards;
mod sink;
mod texts;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Args;
use jiff::tz::TimeZone;
use log::{debug, error, info, warn};
use teloxide::{prelude::*, utils::command::BotCommands};
use tokio::time::MissedTickBehavior;
use waypoint_core::{
    llm::client::{DEFAULT_BASE_URL, DEFAULT_MODEL},
    Coach, OpenAiClient, OpenAiConfig, PurgeInactive,
};

use handlers::Command;
pub use sink::TelegramSink;

/// Run the Telegram bot
#[derive(Args)]
pub struct ServeArgs {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// API key of the OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Chat model used for the interview and plan generation
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Comma-separated Telegram IDs that are made admins on startup
    #[arg(long, env = "WAYPOINT_ADMINS", value_delimiter = ',')]
    pub admins: Vec<u64>,

    /// Link shown to users without access
    #[arg(long, env = "WAYPOINT_SUPPORT_URL")]
    pub support_url: Option<String>,

    /// Minutes between deadline sweeps
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,

    /// Also remove users without access idle for this many days on every sweep
    #[arg(long, env = "WAYPOINT_PURGE_DAYS")]
    pub purge_days: Option<u32>,
}

/// Shared by all handlers.
pub struct BotState {
    pub coach: Coach,
    pub llm: OpenAiClient,
    pub sink: TelegramSink,
    pub support_url: Option<String>,
}

impl BotState {
    pub fn timezone(&self) -> &TimeZone {
        &self.coach.tracker().policy().timezone
    }
}

pub async fn run(coach: Coach, args: ServeArgs) -> Result<()> {
    let config = OpenAiConfig::new(args.openai_api_key)
        .with_model(args.openai_model)
        .with_base_url(args.openai_base_url);
    let llm = OpenAiClient::new(config).context("Failed to create LLM client")?;

    coach
        .ensure_admins(&args.admins)
        .await
        .context("Failed to register admins")?;

    let bot = Bot::new(args.bot_token);
    let timezone = coach.tracker().policy().timezone.clone();
    let (sink, delivery) = TelegramSink::spawn(bot.clone(), timezone);
    let state = Arc::new(BotState {
        coach,
        llm,
        sink,
        support_url: args.support_url,
    });

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("failed to register the command menu: {e}");
    }

    let period = Duration::from_secs(args.sweep_interval * 60);
    let sweeps = tokio::spawn(sweep_loop(Arc::clone(&state), period, args.purge_days));

    let command_state = Arc::clone(&state);
    let message_state = Arc::clone(&state);
    let callback_state = Arc::clone(&state);
    let handler = dptree::entry()
        .branch(
            Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let state = Arc::clone(&callback_state);
                async move { handlers::handle_callback(bot, q, state).await }
            }),
        )
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                    let state = Arc::clone(&command_state);
                    async move { handlers::handle_command(bot, msg, cmd, state).await }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some_and(|t| t.starts_with('/')))
                .endpoint(|bot: Bot, msg: Message| async move {
                    bot.send_message(msg.chat.id, texts::UNKNOWN_COMMAND).await?;
                    respond(())
                }),
        )
        .branch(
            Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let state = Arc::clone(&message_state);
                async move { handlers::handle_message(bot, msg, state).await }
            }),
        );

    info!("Telegram bot is running");
    Dispatcher::builder(bot, handler)
        .default_handler(|upd| async move {
            debug!("unhandled update: {upd:?}");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram bot stopped");
    sweeps.abort();
    delivery.abort();
    Ok(())
}

async fn sweep_loop(state: Arc<BotState>, period: Duration, purge_days: Option<u32>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match state.coach.run_sweeps(&state.sink).await {
            Ok(report) => debug!("sweep finished: {report}"),
            Err(e) => error!("sweep failed: {e}"),
        }
        if let Some(days) = purge_days {
            match state.coach.purge_inactive(&PurgeInactive { days }).await {
                Ok(removed) if !removed.is_empty() => {
                    info!("purged {} inactive users", removed.len());
                }
                Ok(_) => {}
                Err(e) => error!("purge failed: {e}"),
            }
        }
    }
}
