use crate::commands::{self, CommandReport};
use crate::vault::archiver::ArchiveMode;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "chatvault",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (build ", env!("BUILD_UUID"), ")"),
    about = "Archive live-stream metadata and chat transcripts into durable JSON caches."
)]
struct Cli {
    /// Emit the command report as JSON instead of plain lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Live,
    Ended,
}

impl From<ModeArg> for ArchiveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Live => ArchiveMode::Live,
            ModeArg::Ended => ArchiveMode::Ended,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover archival-eligible videos for every configured channel.
    Discover,
    /// Advance chat transcripts for videos in the mode's target state.
    Archive {
        /// `live` polls open streams cheaply; `ended` drains finished ones.
        #[arg(long, value_enum)]
        mode: ModeArg,
    },
    /// Discovery, then the ended sweep, then the live poll.
    Sync,
    /// Report registry, cursor store, and transcript state.
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match cli.command {
        Command::Discover => commands::discover::run()?,
        Command::Archive { mode } => commands::archive::run(mode.into())?,
        Command::Sync => commands::sync::run()?,
        Command::Status => commands::status::run()?,
    };
    render(&report, cli.json)
}

fn render(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for detail in &report.details {
            println!("{detail}");
        }
        for issue in &report.issues {
            eprintln!("issue: {issue}");
        }
    }

    if !report.ok {
        anyhow::bail!(
            "{} completed with {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
