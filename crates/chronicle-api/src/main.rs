//! Chronicle CLI and query API entry point.
//!
//! Binary name: `chronicle`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler or starts the read-only
//! HTTP query API.

mod cli;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use clap_complete::generate;
use console::style;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommand, MilestoneCommand, NextCommand, ProviderCommand, RepoCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chronicle=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chronicle", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (config, DB)
    let mut state = AppState::init().await?;

    match cli.command {
        Commands::Init => {
            println!("  {} Chronicle initialized", style("✓").green().bold());
            println!(
                "  {}",
                style(format!("Data directory: {}", state.data_dir.display())).dim()
            );
            println!(
                "  {}",
                style(format!("Config: {}", state.config_store.path().display())).dim()
            );
            println!();
            println!("  Next steps:");
            println!(
                "    1. Track a repository: {}",
                style("chronicle repo add /path/to/repo").cyan()
            );
            println!(
                "    2. Record a session: {}",
                style("chronicle record claude").cyan()
            );
            println!(
                "    3. View activity: {}",
                style("chronicle show today").cyan()
            );
        }

        Commands::Repo { action } => match action {
            RepoCommand::Add { path, limit } => {
                cli::repo::add(&mut state, &path, limit, cli.json).await?;
            }
            RepoCommand::Sync { path, limit } => {
                cli::repo::sync(&state, path.as_deref(), limit, cli.json).await?;
            }
            RepoCommand::Stats { path } => {
                cli::repo::stats(&state, &path, cli.json).await?;
            }
        },

        Commands::Show { period, repo } => {
            cli::activity::show(&state, period.into(), repo.as_deref(), cli.json).await?;
        }

        Commands::Ai { period, tool } => {
            cli::activity::ai(&state, period.into(), tool.as_deref(), cli.json).await?;
        }

        Commands::Timeline { period, repo } => {
            cli::activity::timeline(&state, period.into(), repo.as_deref(), cli.json).await?;
        }

        Commands::Search { term, limit } => {
            cli::activity::search(&state, &term, limit, cli.json).await?;
        }

        Commands::Stats { days } => {
            cli::activity::stats(&state, days, cli.json).await?;
        }

        Commands::Sessions { limit } => {
            cli::session::list(&state, limit, cli.json).await?;
        }

        Commands::Session { id } => {
            cli::session::show(&state, id, cli.json).await?;
        }

        Commands::Record { tool, command } => {
            cli::record::record(&state, &tool, command.as_deref(), cli.json).await?;
        }

        Commands::Summarize { id, force } => {
            cli::session::summarize(&state, id, force, cli.json).await?;
        }

        Commands::Digest => {
            cli::activity::digest(&state, cli.json).await?;
        }

        Commands::Milestone { action } => match action {
            MilestoneCommand::Add {
                title,
                kind,
                priority,
                description,
                tags,
            } => {
                cli::milestone::add_milestone(&state, &title, &kind, priority, description, tags, cli.json)
                    .await?;
            }
            MilestoneCommand::List { status } => {
                cli::milestone::list_milestones(&state, status.as_deref(), cli.json).await?;
            }
            MilestoneCommand::Done { id } => {
                cli::milestone::complete_milestone(&state, id, cli.json).await?;
            }
        },

        Commands::Next { action } => match action {
            NextCommand::Add {
                description,
                priority,
                category,
                milestone,
            } => {
                cli::milestone::add_step(&state, &description, priority, &category, milestone, cli.json)
                    .await?;
            }
            NextCommand::List { all } => {
                cli::milestone::list_steps(&state, all, cli.json).await?;
            }
            NextCommand::Done { id } => {
                cli::milestone::complete_step(&state, id, cli.json).await?;
            }
        },

        Commands::Config { action } => match action {
            ConfigCommand::Get { key } => {
                cli::config_cmd::get(&state, &key, cli.json)?;
            }
            ConfigCommand::Set { key, value } => {
                cli::config_cmd::set(&state, &key, &value, cli.json)?;
            }
            ConfigCommand::List => {
                cli::config_cmd::list(&state, cli.json)?;
            }
        },

        Commands::Provider { action } => match action {
            ProviderCommand::Test => {
                cli::provider_cmd::test(&state, cli.json).await?;
            }
        },

        Commands::Quota => {
            cli::provider_cmd::quota(&state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Chronicle query API listening on {}",
                style("⚡").bold(),
                style(format!("http://{addr}")).cyan()
            );
            println!("  {}", style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(Arc::new(state));

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
