mod commands;
mod pager;
mod registry;

use std::collections::HashMap;
use std::env;
use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::StandardFramework,
    model::gateway::Ready,
    prelude::GatewayIntents,
    prelude::TypeMapKey,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::registry::CommandCatalog;

use crate::commands::{GENERAL_GROUP, HELP_GROUP, OWNER_GROUP};

/// When this process came up; the stats command reports uptime against it.
pub static LAUNCH_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// TypeMap key for the shared, read-only command catalog the help system
/// pages over.
pub struct CatalogKey;
impl TypeMapKey for CatalogKey {
    type Value = Arc<CommandCatalog>;
}

// Event handler implementation
struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        println!("✅ Bot connected as {}!", ready.user.name);
        log::info!(
            "[MAIN] connected as {} ({}) to {} guilds",
            ready.user.name,
            ready.user.id,
            ready.guilds.len()
        );
    }
}

// Small stdin console so the bot can be stopped from the terminal it runs in
async fn handle_command_line(shutdown_tx: mpsc::Sender<String>) {
    use tokio::time::{sleep, Duration};

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Wait for bot to connect and show connection messages before showing prompt
    sleep(Duration::from_millis(1500)).await;

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    if stdout.write_all(b"\n> ").await.is_err() {
        return;
    }
    let _ = stdout.flush().await;

    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                let command = line.trim().to_lowercase();

                match command.as_str() {
                    "quit" | "q" | "exit" => {
                        println!("⏹️  Shutting down bot...");
                        if shutdown_tx.send("quit".to_string()).await.is_err() {
                            log::error!("[MAIN] failed to send shutdown signal");
                        }
                        break;
                    }
                    "help" | "h" => {
                        println!("🤖 Available commands:");
                        println!("  quit, q, exit  - Stop the bot gracefully");
                        println!("  help, h        - Show this help message");
                        println!("  status         - Show bot status");
                    }
                    "status" => {
                        println!("🤖 Bot Status: Running");
                        println!("⏱️  Launched at: {}", *LAUNCH_TIME);
                    }
                    "" => {
                        // Empty line, do nothing
                    }
                    _ => {
                        println!(
                            "❓ Unknown command: '{}'. Type 'help' for available commands.",
                            command
                        );
                    }
                }

                if !matches!(command.as_str(), "quit" | "q" | "exit") {
                    if stdout.write_all(b"> ").await.is_err() {
                        break;
                    }
                    let _ = stdout.flush().await;
                }
            }
            Ok(None) => break, // EOF
            Err(e) => {
                log::error!("[MAIN] error reading command line: {}", e);
                break;
            }
        }
    }
}

/// Read configuration from botconfig.txt with multi-path fallback. Values
/// are exported to the environment so commands can reach them directly.
pub fn load_bot_config() -> Result<HashMap<String, String>, String> {
    let config_paths = [
        "botconfig.txt",
        "../botconfig.txt",
        "../../botconfig.txt",
        "src/botconfig.txt",
    ];

    // Clear any existing relevant environment variables
    env::remove_var("DISCORD_TOKEN");
    env::remove_var("PREFIX");
    env::remove_var("BOT_OWNER_ID");
    env::remove_var("HELP_TIMEOUT_SECS");

    for config_path in &config_paths {
        match fs::read_to_string(config_path) {
            Ok(content) => {
                // Remove BOM if present
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
                let mut config = HashMap::new();

                // Parse the config file line by line
                for line in content.lines() {
                    let line = line.trim();

                    // Skip empty lines and comments
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }

                    // Parse KEY=VALUE format
                    if let Some(equals_pos) = line.find('=') {
                        let key = line[..equals_pos].trim().to_string();
                        let value = line[equals_pos + 1..].trim().to_string();

                        // Set environment variable for compatibility
                        env::set_var(&key, &value);
                        config.insert(key, value);
                    }
                }

                println!("✅ Configuration loaded from {}", config_path);
                return Ok(config);
            }
            Err(_) => {
                // Try next path
                continue;
            }
        }
    }

    Err("No botconfig.txt file found in any expected location (., .., ../.., src/)".to_string())
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"))
        .format_timestamp_secs()
        .init();

    // Pin the launch timestamp before anything else happens.
    Lazy::force(&LAUNCH_TIME);

    // Load configuration from botconfig.txt file
    if let Err(error) = load_bot_config() {
        log::error!("❌ Failed to load botconfig.txt: {}", error);
        eprintln!("❌ Failed to load botconfig.txt: {}", error);
        eprintln!(
            "Create a botconfig.txt file in the project root with: \
             DISCORD_TOKEN=your_token_here, PREFIX=^ and BOT_OWNER_ID=your_user_id"
        );
        return;
    }

    // Get Discord token from configuration
    let token = match env::var("DISCORD_TOKEN") {
        Ok(token) => {
            if token == "YOUR_BOT_TOKEN_HERE" || token.is_empty() {
                log::error!("❌ DISCORD_TOKEN in botconfig.txt is set to placeholder value");
                eprintln!("❌ DISCORD_TOKEN in botconfig.txt is set to placeholder! Replace with your actual Discord bot token.");
                return;
            }
            token
        }
        Err(_) => {
            log::error!("❌ DISCORD_TOKEN not found in botconfig.txt file");
            eprintln!("❌ DISCORD_TOKEN not found in botconfig.txt file!");
            return;
        }
    };

    if commands::owner::bot_owner_id().is_none() {
        println!("⚠️  BOT_OWNER_ID not set; owner commands will be unavailable");
    }

    // Get command prefix from configuration
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "^".to_string());
    println!("🤖 Starting bot with prefix: '{}'", prefix);

    // Set up command framework
    let framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&prefix)
                .case_insensitivity(true)
                .no_dm_prefix(true)
                .with_whitespace(true)
        })
        .after(|_ctx, msg, command_name, result| {
            Box::pin(async move {
                if let Err(e) = result {
                    log::error!(
                        "❌ Command '{}' failed for user {} ({}): {:?}",
                        command_name,
                        msg.author.name,
                        msg.author.id,
                        e
                    );
                }
            })
        })
        .unrecognised_command(|_ctx, msg, unrecognised| {
            let name = unrecognised.to_string();
            Box::pin(async move {
                log::debug!(
                    "❓ Unrecognised command '{}' attempted by user {}",
                    name,
                    msg.author.id
                );
            })
        })
        .group(&GENERAL_GROUP)
        .group(&HELP_GROUP)
        .group(&OWNER_GROUP);

    // Configure bot intents; reactions drive the help pager
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    // Create and start client
    let mut client = match Client::builder(token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    // Publish the command catalog the help system reads
    {
        let mut data = client.data.write().await;
        data.insert::<CatalogKey>(Arc::new(registry::default_catalog()));
    }

    // Set up command line interface for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);
    let cmd_task = tokio::spawn(handle_command_line(shutdown_tx));

    println!("🚀 Bot is running...");
    println!("💡 Use 'quit' command to stop gracefully, or press Ctrl+C");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        shutdown_signal = shutdown_rx.recv() => {
            if let Some(signal) = shutdown_signal {
                println!("📡 Received '{}' command, stopping bot gracefully...", signal);
            }
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    cmd_task.abort();
    println!("✅ Bot stopped");
}
