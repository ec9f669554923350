use clap::Parser;
use replyflow::config::EnvConfig;
use replyflow::logger::init_tracing;
use std::path::PathBuf;

mod cli;

use cli::{Cli, CliContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_level, None);

    let config = EnvConfig::new(PathBuf::from(".env"));
    let context = CliContext::new(config);

    cli::execute(&context, cli.command).await
}
