//! Waypoint command-line entry point.
//!
//! Runs the Telegram bot (`serve`) or one of the admin commands against the
//! same database.

mod args;
mod cli;
mod renderer;
mod telegram;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use jiff::tz::TimeZone;
use log::info;
use renderer::TerminalRenderer;
use waypoint_core::{CoachBuilder, TrackerPolicy};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    dotenvy::dotenv().ok();
    env_logger::init();

    let Args {
        database_file,
        no_color,
        timezone,
        command,
    } = Args::parse();

    let timezone =
        TimeZone::get(&timezone).with_context(|| format!("Unknown timezone '{timezone}'"))?;

    let coach = CoachBuilder::new()
        .with_database_path(database_file)
        .with_policy(TrackerPolicy::with_timezone(timezone))
        .build()
        .await
        .context("Failed to initialize coach")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Waypoint started");

    match command {
        Some(User { command }) => {
            Cli::new(coach, renderer)
                .handle_user_command(command)
                .await
        }
        Some(Purge(args)) => Cli::new(coach, renderer).purge(args).await,
        Some(Sweep(args)) => Cli::new(coach, renderer).sweep(args).await,
        Some(Serve(args)) => {
            info!("Starting Telegram bot");
            telegram::run(coach, args)
                .await
                .context("Telegram bot failed")
        }
        None => Cli::new(coach, renderer).list_users().await,
    }
}
