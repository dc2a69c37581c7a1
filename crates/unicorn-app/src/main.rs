//! Unicorn application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialize tracing (stderr plus an optional log file)
//! 3. Load the company dataset and build the shared catalog
//! 4. Start the metrics background task
//! 5. Run the read-eval loop over stdin

mod cli;
mod sink;

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unicorn_chat::{Catalog, ChatEngine, ConversationState, TurnOutcome};
use unicorn_core::config::GeneralConfig;
use unicorn_core::{Dataset, MetricsTracker, UnicornConfig};

use cli::CliArgs;
use sink::ChannelSink;

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_tracing(general: &GeneralConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&general.log_level));

    let file_layer = match &general.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn prompt() {
    print!("You: ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing exists; the outcome is logged after init.
    let config_file = args.resolve_config_path();
    let loaded = UnicornConfig::load(&config_file);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => UnicornConfig::default(),
    };
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    if let Some(data) = args.resolve_data_path() {
        config.dataset.path = data;
    }

    init_tracing(&config.general)?;
    tracing::info!("Starting unicorn v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    // Dataset.
    let data_path = Path::new(&config.dataset.path);
    let dataset = match Dataset::from_csv_path(data_path, &config.dataset) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(path = %data_path.display(), error = %e, "Failed to load dataset");
            eprintln!(
                "Error: could not load dataset from {}: {}",
                data_path.display(),
                e
            );
            return Err(e.into());
        }
    };

    let catalog = Arc::new(Catalog::from_config(dataset, &config));
    let engine = ChatEngine::new(Arc::clone(&catalog), &config.chat);

    // Metrics: one tracker for the process, fed off the turn path.
    let tracker = Arc::new(MetricsTracker::new());
    let (metrics, metrics_task) = ChannelSink::spawn(Arc::clone(&tracker));

    println!(
        "Unicorn chatbot ready ({} companies). Type 'exit' to quit, /reset to start over.",
        catalog.dataset().len()
    );

    let mut state = ConversationState::new();
    tracing::info!(session = %state.id(), "Session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "/reset" => {
                state.reset();
                println!("Bot: Starting over. What would you like to know?");
                continue;
            }
            "/history" => {
                println!("{}", serde_json::to_string_pretty(state.history())?);
                continue;
            }
            "/metrics" => {
                metrics.flush().await;
                println!("{}", serde_json::to_string_pretty(&tracker.summary())?);
                continue;
            }
            _ => {}
        }

        match engine.handle_turn(input, &mut state, &metrics) {
            Ok(TurnOutcome::Answer(answer)) => {
                println!("Bot: {}", answer.text);
                if !answer.suggestions.is_empty() {
                    println!("\nYou could also ask:");
                    for suggestion in &answer.suggestions {
                        println!("  - {}", suggestion);
                    }
                }
            }
            Ok(TurnOutcome::Clarification(clarification)) => {
                println!("Bot: {}", clarification.prompt);
            }
            Err(e) => println!("Bot: {}", e.user_message()),
        }
        state.trim_history(config.chat.history_cap);
    }

    drop(metrics);
    let _ = metrics_task.await;
    let summary = tracker.summary();
    tracing::info!(
        session = %state.id(),
        total_queries = summary.total_queries,
        clarifications = summary.clarifications_triggered,
        errors = summary.errors,
        avg_latency_ms = summary.avg_latency_ms,
        "Session ended"
    );
    println!("Goodbye!");
    Ok(())
}
