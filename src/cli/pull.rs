use anyhow::{Context, Result};
use clap::Args;
use replyflow::config::STORAGE_URL_KEY;
use replyflow::service::{FlowStorageType, HttpFlowStorage};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use url::Url;

use super::CliContext;

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Id of the flow to fetch from the storage service
    pub flow_id: String,

    /// Write the document here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: PullArgs, context: &CliContext) -> Result<()> {
    let storage_url = context
        .config
        .get(STORAGE_URL_KEY)
        .await
        .with_context(|| format!("{STORAGE_URL_KEY} is not configured"))?;
    let storage =
        HttpFlowStorage::new(Url::parse(&storage_url).context("invalid flow storage url")?);

    let document = storage.load_by_id(&args.flow_id).await?;
    let rendered = serde_json::to_string_pretty(&document)?;
    match args.out {
        None => println!("{rendered}"),
        Some(out) => {
            fs::write(&out, rendered)
                .with_context(|| format!("Failed to write: {}", out.display()))?;
            info!("pulled flow {} to {}", args.flow_id, out.display());
            println!("Pulled {} to {}", args.flow_id, out.display());
        }
    }
    Ok(())
}
