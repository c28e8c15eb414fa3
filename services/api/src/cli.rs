use crate::demo::{run_demo, run_standings_report, DemoArgs, StandingsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use franchise_recruiting::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Franchise Recruiting",
    about = "Run the candidate competition service or inspect ledger snapshots from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print standings projected from a ledger snapshot export
    Standings(StandingsArgs),
    /// Walk through a scripted recruiting week against an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Ledger snapshot CSV used to hydrate the engine at startup
    #[arg(long)]
    pub(crate) ledger: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Standings(args) => run_standings_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
