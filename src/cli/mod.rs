use clap::{Parser, Subcommand};

pub mod export;
pub mod pull;
pub mod schema;
pub mod validate;

use export::ExportArgs;
use pull::PullArgs;
use schema::SchemaArgs;
use validate::ValidateArgs;

use replyflow::config::ConfigStore;

#[derive(Parser, Debug)]
#[command(
    name = "replyflow",
    about = "Auto-reply flow builder for WhatsApp",
    version = "0.3.0"
)]
pub struct Cli {
    /// Optional log level override (e.g. error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a flow document for structural problems
    Validate(ValidateArgs),

    /// Re-emit a flow document as JSON or YAML
    Export(ExportArgs),

    /// Emit the JSON Schema of the flow document wire format
    Schema(SchemaArgs),

    /// Fetch a flow document from the configured storage service
    Pull(PullArgs),
}

#[derive(Clone)]
pub struct CliContext {
    pub config: ConfigStore,
}

impl CliContext {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }
}

pub async fn execute(context: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => validate::execute(args, context).await,
        Commands::Export(args) => export::execute(args, context).await,
        Commands::Schema(args) => schema::execute(args, context).await,
        Commands::Pull(args) => pull::execute(args, context).await,
    }
}
