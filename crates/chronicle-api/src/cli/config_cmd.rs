//! Configuration commands: get, set, list.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Keys whose values are masked when printed.
fn is_secret(key: &str) -> bool {
    key.contains("api_key")
}

fn mask(value: &str) -> String {
    if value.len() > 12 {
        format!("{}...{}", &value[..8], &value[value.len() - 4..])
    } else {
        "***".to_string()
    }
}

pub fn get(state: &AppState, key: &str, json: bool) -> Result<()> {
    match state.config_store.get_value(key)? {
        Some(value) => {
            if json {
                println!("{}", serde_json::json!({"key": key, "value": value.to_string()}));
            } else if is_secret(key) {
                let display = value.as_str().map(mask).unwrap_or_else(|| "***".to_string());
                println!("  {}: {}", style(key).bold(), display);
            } else {
                println!("  {}: {}", style(key).bold(), value);
            }
        }
        None => {
            println!("  {} '{}' is not set", style("i").blue().bold(), key);
            println!(
                "  Set it with: {}",
                style(format!("chronicle config set {key} <value>")).yellow()
            );
        }
    }
    Ok(())
}

pub fn set(state: &AppState, key: &str, value: &str, json: bool) -> Result<()> {
    state.config_store.set_value(key, value)?;

    if json {
        println!("{}", serde_json::json!({"key": key, "set": true}));
    } else {
        let display = if is_secret(key) { mask(value) } else { value.to_string() };
        println!("  {} Set '{}' to '{}'", style("✓").green().bold(), key, display);
        println!(
            "  {}",
            style(format!("Config: {}", state.config_store.path().display())).dim()
        );
    }
    Ok(())
}

pub fn list(state: &AppState, json: bool) -> Result<()> {
    // Serialize the loaded config rather than dumping the raw file so
    // defaults for unset keys are visible too.
    let mut display = state.config.clone();
    if let Some(key) = display.gemini_api_key.as_deref() {
        display.gemini_api_key = Some(mask(key));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&display)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Chronicle configuration").bold());
    println!();
    println!("{}", toml::to_string_pretty(&display)?);
    println!(
        "  {}",
        style(format!("Config file: {}", state.config_store.path().display())).dim()
    );
    Ok(())
}
