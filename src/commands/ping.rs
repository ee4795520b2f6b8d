// ping.rs - Ping Command Module
// This module implements the ^ping command, which measures and displays the
// bot's response time.
//
// Used by: commands/mod.rs (General group)

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

#[command]
/// Main ^ping command handler
/// Measures and displays the bot's response time in milliseconds
pub async fn ping(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let start_time = std::time::Instant::now();

    // Send the initial response and measure how long the round trip took
    let mut response = msg.reply(ctx, "Pong! Calculating delay...").await?;
    let ping_ms = start_time.elapsed().as_millis();

    if let Err(e) = response
        .edit(&ctx.http, |m| {
            m.content(format!("Pong! Response time: {}ms", ping_ms))
        })
        .await
    {
        // The initial response already went out, so this is not fatal
        log::warn!("[PING] Failed to update ping message with delay: {}", e);
    }

    Ok(())
}
