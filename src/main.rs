use std::process::ExitCode;

use clap::Parser;

use soundcloud_mcp::{cli, infra};

#[tokio::main]
async fn main() -> ExitCode {
    infra::logging::init();
    let args = cli::Cli::parse();
    cli::run(args).await
}
