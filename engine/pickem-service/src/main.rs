//! Pick'em operator CLI
//!
//! Scores provider stat files, submits and locks picks, runs statistics
//! backfills, and prints the league table, all against the JSON snapshot
//! named by `data_file`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use pick_ledger::{LeagueId, MemberId, MemberWeekKey, Position, ProposedPicks, WeekKey};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use pickem_service::{initialize_logging, load_config, score_stats_file, PickemService};

#[derive(Parser)]
#[command(name = "pickem")]
#[command(about = "Weekly QB/RB/WR pick'em: picks, locks, scoring and backfill")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "PICKEM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WeekArgs {
    #[arg(long)]
    league: String,

    #[arg(long)]
    season: u16,

    #[arg(long)]
    week: u8,
}

impl WeekArgs {
    fn key(&self) -> WeekKey {
        WeekKey::new(LeagueId::new(&self.league), self.season, self.week)
    }
}

#[derive(Args)]
struct MemberWeekArgs {
    #[command(flatten)]
    week: WeekArgs,

    #[arg(long)]
    member: String,
}

impl MemberWeekArgs {
    fn key(&self) -> MemberWeekKey {
        self.week.key().member(MemberId::new(&self.member))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and score a provider stat file, printing breakdowns
    Score {
        /// JSON array of provider stat lines
        #[arg(long)]
        stats: PathBuf,
    },

    /// Submit or replace a member's picks for a week
    Submit {
        #[command(flatten)]
        target: MemberWeekArgs,

        /// Quarterback player id (repeat on double-pick weeks)
        #[arg(long)]
        qb: Vec<String>,

        /// Running back player id
        #[arg(long)]
        rb: Vec<String>,

        /// Wide receiver player id
        #[arg(long)]
        wr: Vec<String>,

        /// Treat this RFC 3339 instant as now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Lock transitions
    Lock {
        #[command(subcommand)]
        action: LockAction,
    },

    /// Rescore a week and reconcile stored scores and standings
    Backfill {
        #[command(flatten)]
        week: WeekArgs,

        /// Read statistics from this file instead of SportsDataIO
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Record a paid-out week, freezing its score against backfill
    Payout {
        #[command(flatten)]
        target: MemberWeekArgs,
    },

    /// Print the ranked season table
    Standings {
        #[arg(long)]
        league: String,

        #[arg(long)]
        season: u16,
    },
}

#[derive(Subcommand)]
enum LockAction {
    /// Lock every pick set of the week whose lock time has passed
    Due {
        #[command(flatten)]
        week: WeekArgs,

        /// Treat this RFC 3339 instant as now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Lock one member's picks immediately
    Admin {
        #[command(flatten)]
        target: MemberWeekArgs,
    },

    /// Revert one member's lock and release its usage
    Undo {
        #[command(flatten)]
        target: MemberWeekArgs,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to encode output")?);
    Ok(())
}

fn proposal(qb: Vec<String>, rb: Vec<String>, wr: Vec<String>) -> ProposedPicks {
    let mut picks = ProposedPicks::new();
    for (position, ids) in
        [(Position::Quarterback, qb), (Position::RunningBack, rb), (Position::WideReceiver, wr)]
    {
        for id in ids {
            picks = picks.with(position, id);
        }
    }
    picks
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;
    info!("pickem v{}", env!("CARGO_PKG_VERSION"));

    let service = PickemService::open(config)?;
    match cli.command {
        Commands::Score { stats } => print_json(&score_stats_file(&stats)?),
        Commands::Submit { target, qb, rb, wr, at } => {
            let now = at.unwrap_or_else(Utc::now);
            let stored = service.submit(&target.key(), &proposal(qb, rb, wr), now).await?;
            print_json(&stored)
        }
        Commands::Lock { action } => match action {
            LockAction::Due { week, at } => {
                let summary = service.lock_due(&week.key(), at.unwrap_or_else(Utc::now)).await?;
                print_json(&summary)
            }
            LockAction::Admin { target } => {
                print_json(&service.admin_lock(&target.key(), Utc::now()).await?)
            }
            LockAction::Undo { target } => print_json(&service.undo_lock(&target.key()).await?),
        },
        Commands::Backfill { week, stats } => {
            let status = service.backfill(&week.key(), stats.as_deref()).await?;
            print_json(&status)
        }
        Commands::Payout { target } => print_json(&service.mark_payout(&target.key()).await?),
        Commands::Standings { league, season } => {
            print_json(&service.standings(&LeagueId::new(league), season).await?)
        }
    }
}
