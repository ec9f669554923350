use anyhow::{Context, Result};
use clap::Args;
use replyflow::document::FlowDocument;
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

use super::CliContext;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Write the schema here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: SchemaArgs, _context: &CliContext) -> Result<()> {
    let schema = schema_for!(FlowDocument);
    let rendered = serde_json::to_string_pretty(&schema)?;
    match args.out {
        None => println!("{rendered}"),
        Some(out) => {
            fs::write(&out, rendered)
                .with_context(|| format!("Failed to write: {}", out.display()))?;
            println!("Schema written to {}", out.display());
        }
    }
    Ok(())
}
