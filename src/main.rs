use api_key_desk::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cli::serve::run(cli::serve::ServeArgs::default()).await,
        Some(Command::Serve(args)) => cli::serve::run(args).await,
        Some(Command::Api) => cli::api::run().await,
        Some(Command::Ui(args)) => cli::ui::run(args).await,
        Some(Command::Console(args)) => cli::console::run(args).await,
        Some(Command::Session(args)) => cli::session::run(args).await,
    }
}
