//! CLI harness for the rewrite plugin.
//!
//! Drives the plugin the way the hosting runtime would: enables it with a
//! rules file (or the shipped default), then rewrites stdin line by line.

use anyhow::{Context, Result};
use chat_rewrite_plugin::{
    MapSettings, MessageEvent, MessagePlugin, RewritePlugin, DEFAULT_RULES_JSON, RULES_SETTING_ID,
};
use clap::Parser;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chat-rewrite-plugin")]
#[command(
    author,
    version,
    about = "Regex rewrite plugin for outgoing chat messages"
)]
struct Args {
    /// Rules file (JSON array of {regex, flags, replacement} objects)
    #[arg(short, long, env = "REWRITE_RULES_FILE")]
    rules: Option<PathBuf>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the default rule configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate the rules and exit.
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    if args.example_config {
        println!("{}", DEFAULT_RULES_JSON);
        return Ok(());
    }

    let raw = match &args.rules {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?,
        None => DEFAULT_RULES_JSON.to_string(),
    };

    let plugin = RewritePlugin::new();
    let settings = MapSettings::new().with(RULES_SETTING_ID, raw);

    if !plugin.on_enable(&settings).await {
        anyhow::bail!("rules are not a valid JSON rule array");
    }

    if args.validate {
        info!(rules = plugin.rule_count().await, "rules are valid");
        return Ok(());
    }

    info!(
        rules = plugin.rule_count().await,
        "rewrite plugin ready, reading messages from stdin"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read from stdin")?;
        let event = MessageEvent {
            message_id: format!("stdin-{n}"),
            room_id: "stdin".to_string(),
            sender: "stdin".to_string(),
            text: Some(Value::String(line)),
        };
        let event = plugin.on_message_send(event).await;
        writeln!(stdout, "{}", event.text_str().unwrap_or_default())?;
    }

    Ok(())
}
