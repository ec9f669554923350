use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{validate::read_document, CliContext};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Flow document file (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Output file; the extension picks the format. Stdout JSON when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: ExportArgs, _context: &CliContext) -> Result<()> {
    let document = read_document(&args.file)?;

    match args.out {
        None => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Some(out) => {
            let rendered = match out.extension().and_then(|s| s.to_str()) {
                Some("json") => serde_json::to_string_pretty(&document)?,
                Some("yaml") | Some("yml") => serde_yaml_bw::to_string(&document)?,
                _ => bail!("Unsupported output extension for: {}", out.display()),
            };
            fs::write(&out, rendered)
                .with_context(|| format!("Failed to write: {}", out.display()))?;
            info!("exported {} to {}", args.file.display(), out.display());
            println!("Exported to {}", out.display());
        }
    }
    Ok(())
}
