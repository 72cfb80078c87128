//! Command handlers for vederctl.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;
use veder_common::{Config, ResearchEngine, Submission};
use veder_shared::{materialize, normalize, Language, Report};

use crate::output;

pub async fn report(config: Config, query: &str, language: Language, json: bool) -> Result<()> {
    let engine = ResearchEngine::from_config(config)?;
    match engine.submit(query, language).await {
        Ok(Submission::Current(report)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::format_summary(&report));
            }
            Ok(())
        }
        // A single CLI invocation issues one ticket
        Ok(Submission::Superseded) => Ok(()),
        Err(e) => {
            output::print_error(&e, language);
            Err(e.into())
        }
    }
}

pub async fn market(config: Config, language: Language) -> Result<()> {
    let engine = ResearchEngine::from_config(config)?;
    let market = engine.market_intelligence_or_empty(language).await;
    println!("{}", serde_json::to_string_pretty(&market)?);
    Ok(())
}

/// Offline pipeline run over saved model text
pub fn repair(file: Option<&Path>, language: Language) -> Result<()> {
    let raw = match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    debug!("Repairing {} bytes of model output", raw.len());

    let report = repair_text(&raw, language).map_err(|e| {
        output::print_error(&e, language);
        e
    })?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn repair_text(raw: &str, language: Language) -> veder_shared::Result<Report> {
    let parsed = normalize(raw)?;
    Ok(materialize(&parsed, language))
}
