//! podcast-gen CLI entry point

use std::process::ExitCode;

use clap::Parser;

use podcast_gen::cli::{run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; flags and the environment still apply
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    run(cli).await
}
