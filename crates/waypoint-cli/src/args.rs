use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cli::{PurgeArgs, SweepArgs, UserCommands},
    telegram::ServeArgs,
};

/// Telegram goal coach and its admin command line
///
/// Waypoint interviews users about a goal, asks a language model for a staged
/// plan and keeps them on schedule with deadline reminders. The `serve`
/// command runs the bot; the other commands inspect and administer the same
/// database.
#[derive(Parser)]
#[command(version, about, name = "waypoint")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/waypoint/waypoint.db
    #[arg(long, global = true, env = "WAYPOINT_DATABASE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// IANA timezone in which deadlines fall and reminder hours are read
    #[arg(
        long,
        global = true,
        env = "WAYPOINT_TIMEZONE",
        default_value = "Europe/Moscow"
    )]
    pub timezone: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
///
/// Without a command the user list is printed.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and administer users
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Remove idle users without access
    Purge(PurgeArgs),
    /// Run the overdue and reminder sweeps once
    Sweep(SweepArgs),
    /// Run the Telegram bot
    Serve(ServeArgs),
}
