use anyhow::{bail, Context, Result};
use clap::Args;
use replyflow::document::{validate_document, FlowDocument, Severity};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::CliContext;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Flow document file (.json, .yaml or .yml)
    pub file: PathBuf,
}

pub async fn execute(args: ValidateArgs, _context: &CliContext) -> Result<()> {
    let document = read_document(&args.file)?;
    let issues = validate_document(&document);

    if issues.is_empty() {
        info!("✅ Valid flow: {}", args.file.display());
        println!("{} is valid", args.file.display());
        return Ok(());
    }

    let mut errors = 0;
    for issue in &issues {
        match issue.severity {
            Severity::Error => {
                errors += 1;
                println!("error: {}", issue.message);
            }
            Severity::Warning => println!("warning: {}", issue.message),
        }
    }
    if errors > 0 {
        bail!("{errors} error(s) in {}", args.file.display());
    }
    Ok(())
}

/// Read a flow document from disk; JSON and YAML are both accepted.
pub fn read_document(path: &Path) -> Result<FlowDocument> {
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON flow in: {}", path.display())),
        Some("yaml") | Some("yml") => serde_yaml_bw::from_str(&content)
            .with_context(|| format!("Invalid YAML flow in: {}", path.display())),
        _ => bail!("Unsupported file extension for: {}", path.display()),
    }
}
