pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "lavka",
    about = "Lavka operator CLI",
    long_about = "Apply migrations, seed the demo catalog, inspect configuration, and run agent queries against the local database.",
    after_help = "Examples:\n  lavka migrate\n  lavka seed\n  lavka ask \"покажи все продукты\"\n  lavka plan \"создай заказ: продукт 1, количество 2\""
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a lavka.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo catalog into an empty product table")]
    Seed,
    #[command(about = "Answer a query with the agent against the configured database")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "Query text; several words are joined by spaces")]
        query: Vec<String>,
    },
    #[command(about = "Print the plan a query resolves to without touching the database")]
    Plan {
        #[arg(required = true, num_args = 1.., help = "Query text; several words are joined by spaces")]
        query: Vec<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(config_path),
        Command::Seed => commands::seed::run(config_path),
        Command::Ask { query } => commands::ask::run(config_path, &query.join(" ")),
        Command::Plan { query } => commands::plan::run(&query.join(" ")),
        Command::Config => commands::config::run(config_path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
