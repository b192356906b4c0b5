use crate::demo::{run_demo, run_price, run_rank, DemoArgs, PriceArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use nemt_dispatch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "NEMT Dispatch Console",
    about = "Rank fulfillment options, suggest marketplace pricing, and serve the dispatch API",
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
    /// Rank fulfillment options from a JSON file of constraints and options
    Rank(RankArgs),
    /// Print the pricing suggestion for a trip distance and level of service
    Price(PriceArgs),
    /// Walk through posting, searching, and assigning a sample trip
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Price(args) => run_price(args),
        Command::Demo(args) => run_demo(args),
    }
}
