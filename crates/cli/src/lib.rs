pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "expertise",
    about = "Team expertise operator CLI",
    long_about = "Apply migrations, inspect configuration, check readiness and read stored expertise.",
    after_help = "Examples:\n  expertise doctor --json\n  expertise config\n  expertise experts --team T0123"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, verification token shape, DB connectivity and schema")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List stored expertise records as JSON")]
    Experts {
        #[arg(long, help = "Only list records for this Slack team id")]
        team: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Experts { team } => commands::experts::run(team.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
