//! Provider diagnostics: connection test and quota display.

use anyhow::Result;
use chrono::Utc;
use console::style;

use chronicle_core::provider::GenerationProvider;
use chronicle_core::repository::QuotaLedger;

use crate::cli::format;
use crate::state::AppState;

/// Send a tiny prompt through the configured provider.
pub async fn test(state: &AppState, json: bool) -> Result<()> {
    let provider = state.provider()?;
    let model = state
        .config
        .models
        .default_order()
        .first()
        .map(|m| m.name.clone())
        .unwrap_or_else(|| state.config.ollama_model.clone());

    if !json {
        println!();
        println!(
            "  Testing {} with model {}...",
            style(provider.name()).cyan().bold(),
            style(&model).yellow()
        );
    }

    match provider
        .generate("Say 'Hello from Chronicle!' in exactly 5 words.", &model)
        .await
    {
        Ok(response) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "provider": provider.name(),
                        "model": model,
                        "response": response.trim(),
                    })
                );
            } else {
                println!("  {} Connection successful", style("✓").green().bold());
                println!("  Response: {}", style(response.trim()).dim());
                println!();
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "provider": provider.name(),
                        "model": model,
                        "error": err.to_string(),
                    })
                );
            } else {
                println!("  {} Connection failed: {}", style("✗").red().bold(), err);
                println!();
                println!("  Troubleshooting:");
                println!("    1. Check the key: chronicle config get gemini_api_key");
                println!("    2. Or point at Ollama: chronicle config set provider ollama");
                println!();
            }
            anyhow::bail!("provider test failed")
        }
    }
}

/// Show today's per-model usage counters.
pub async fn quota(state: &AppState, json: bool) -> Result<()> {
    let today = Utc::now().date_naive();
    let records = state.ledger().usage_for_date(today).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("  {} No requests today.", style("i").blue().bold());
        return Ok(());
    }

    println!();
    println!("  Model usage for {}", style(today).bold());
    println!();
    println!("{}", format::quota_table(&records));

    // Show remaining headroom against the catalog limits.
    for record in &records {
        if let Some(model) = state.config.models.get(&record.model_name) {
            let remaining = model.daily_request_limit.saturating_sub(record.request_count);
            println!(
                "  {} {} of {} requests remaining",
                style("·").dim(),
                style(remaining).bold(),
                model.daily_request_limit
            );
        }
    }
    println!();
    Ok(())
}
