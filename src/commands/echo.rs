// echo.rs - Echo Command Module
// This module implements the ^echo command, which simply repeats back user
// input for testing purposes.
//
// Used by: commands/mod.rs (General group)

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

#[command]
/// Main ^echo command handler
/// Echoes back the user's input text
pub async fn echo(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let text = args.message();
    if text.is_empty() {
        msg.reply(ctx, "Please provide text to echo!").await?;
    } else {
        msg.reply(ctx, text).await?;
    }
    Ok(())
}
