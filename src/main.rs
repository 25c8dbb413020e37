use clap::Parser;
use listing_lab::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Score(args) => cli::score::run(args).await,
        Command::List => cli::list::run().await,
        Command::Report(args) => cli::report::run(args).await,
        Command::Demo(args) => cli::demo::run(args).await,
    }
}
