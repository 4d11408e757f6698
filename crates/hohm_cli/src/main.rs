//! Command-line front end for a HOHM household session.
//!
//! Members and tasks are drafted into a named snapshot session stored in
//! SQLite, browsed through the calendar view and optionally committed to a
//! durable household.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hohm")]
#[command(about = "Coordinate household chores from the terminal")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "hohm.sqlite3")]
    db: PathBuf,

    /// Snapshot session to work in
    #[arg(long, global = true, default_value = "default")]
    session: String,

    /// Absolute directory for log files (defaults to ./logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage household members in the session draft
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Manage and update tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Browse the calendar
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },
    /// Durable households
    Household {
        #[command(subcommand)]
        action: HouseholdAction,
    },
    /// Drop every snapshot of the session
    Reset,
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a member with a generated color
    Add { name: String, email: String },
    /// List members with color, average rating and points
    List,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task (date YYYY-MM-DD, time HH:MM)
    Add {
        title: String,
        date: String,
        time: String,
        assigned_to: String,
    },
    /// List tasks, optionally for one date
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Toggle completion (task id or unique id prefix)
    Complete { id: String },
    /// Rate a completed task 1-5
    Rate { id: String, rating: i64 },
    /// Append a comment
    Comment { id: String, text: String },
}

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Dates that carry tasks, with their marker
    Dates,
    /// Tasks of one day (defaults to today)
    Day { date: Option<String> },
    /// Tasks assigned to a member
    Member { name: String },
    /// Member legend
    Legend,
}

#[derive(Subcommand)]
pub enum HouseholdAction {
    /// Create a household record
    Create { name: String },
    /// Show a household record
    Show { id: i64 },
    /// Commit the session draft into the household
    Commit { id: i64 },
    /// Load a household's committed roster into the session
    Checkout { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match cli.log_dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .context("resolve current directory")?
            .join("logs"),
    };
    let log_level = cli
        .log_level
        .unwrap_or_else(|| hohm_core::default_log_level().to_string());
    hohm_core::init_logging(&log_level, &log_dir.to_string_lossy())?;

    let conn = hohm_core::db::open_db(&cli.db)
        .with_context(|| format!("open database {}", cli.db.display()))?;
    commands::run(&conn, &cli.session, cli.command)
}
