// owner.rs - Owner Administration Module
// This module contains commands that only the bot owner can use: runtime
// statistics, git push/pull against the bot's own checkout, configuration
// reload, and restart/shutdown of the process.
//
// Used by: commands/mod.rs (Owner group)

use std::env;

use chrono::Utc;
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::channel::Message,
    model::id::UserId,
    utils::Colour,
};
use tokio::process::Command;

// ============================================================================
// OWNER GATE
// ============================================================================

/// The configured owner, if BOT_OWNER_ID is set and parses.
pub fn bot_owner_id() -> Option<u64> {
    env::var("BOT_OWNER_ID").ok()?.trim().parse().ok()
}

/// Whether this user is the bot owner. With no owner configured, nobody is.
pub fn is_owner(user_id: UserId) -> bool {
    bot_owner_id().map(|id| id == user_id.0).unwrap_or(false)
}

/// Reply with an access-denied notice unless the author is the owner.
/// Returns true when the command may proceed.
async fn require_owner(ctx: &Context, msg: &Message) -> serenity::Result<bool> {
    if is_owner(msg.author.id) {
        return Ok(true);
    }
    msg.reply(
        ctx,
        "**Access Denied**\nThis command can only be used by the bot owner.",
    )
    .await?;
    Ok(false)
}

// ============================================================================
// SUBPROCESS HELPERS
// ============================================================================

/// Run git with the given arguments and collapse stdout/stderr into one
/// report string. Never fails; a spawn error becomes the report.
async fn run_git(args: &[&str]) -> String {
    match Command::new("git").args(args).output().await {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(stderr);
            }
            if text.is_empty() {
                "(no output)".to_string()
            } else {
                text
            }
        }
        Err(e) => format!("fatal: could not run git: {}", e),
    }
}

/// Git reports failures in prose; "fatal"/"error" in the output is the
/// closest thing to an exit signal once streams are collapsed.
fn looks_errored(output: &str) -> bool {
    ["fatal", "error"].iter().any(|word| output.contains(word))
}

/// Keep subprocess output short enough for an embed code block.
fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars).collect();
    clipped.push_str("\n[output truncated]");
    clipped
}

fn step_block(label: &str, ok: bool, output: &str) -> String {
    let mark = if ok { "\u{2705}" } else { "\u{274C}" };
    format!("**{}:**\n{} ```\n{}```\n", label, mark, clip(output, 900))
}

// ============================================================================
// UPTIME
// ============================================================================

/// "Xd, Xh, Xm, Xs" for a duration in whole seconds.
fn format_uptime(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let (hours, remainder) = (total_seconds / 3600, total_seconds % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);
    let (days, hours) = (hours / 24, hours % 24);
    format!("`{}d, {}h, {}m, {}s`", days, hours, minutes, seconds)
}

// ============================================================================
// COMMAND IMPLEMENTATIONS
// ============================================================================

#[command]
#[aliases("info")]
/// Main ^stats command handler (owner only)
/// Shows uptime, cached guild/user/channel counts, catalog totals and the
/// most recent git commits
pub async fn stats(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }

    let uptime = format_uptime((Utc::now() - *crate::LAUNCH_TIME).num_seconds());
    let commits = run_git(&["log", "-3", "--pretty=format:%h %s (%cr)"]).await;

    let guild_count = ctx.cache.guild_count();
    let user_count = ctx.cache.user_count();
    let mut channel_count = 0usize;
    for guild_id in ctx.cache.guilds() {
        if let Some(guild) = ctx.cache.guild(guild_id) {
            channel_count += guild.channels.len();
        }
    }

    let (command_count, category_count) = {
        let data = ctx.data.read().await;
        match data.get::<crate::CatalogKey>() {
            Some(catalog) => (catalog.command_count(), catalog.categories().len()),
            None => (0, 0),
        }
    };

    let bot_name = ctx.cache.current_user().name;
    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(format!("**{}** - Bot information", bot_name))
                    .description(format!(
                        "**Commands & categories loaded:** `{}` commands in `{}` categories\n\n\
                         **Latest changes:**\n{}",
                        command_count,
                        category_count,
                        clip(&commits, 900)
                    ))
                    .field(
                        "Servers & Channels",
                        format!("{} servers\n{} channels", guild_count, channel_count),
                        true,
                    )
                    .field("Cached users", format!("{}", user_count), true)
                    .field("Uptime", uptime, true)
                    .colour(Colour::BLURPLE)
                    .timestamp(serenity::model::Timestamp::now())
            })
        })
        .await?;

    Ok(())
}

#[command]
#[sub_commands(push, pull)]
/// Parent ^git command (owner only); dispatches to push/pull
pub async fn git(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }
    msg.reply(ctx, "Usage: `git push [commit message]` or `git pull`")
        .await?;
    Ok(())
}

#[command]
/// ^git push [message] - stage, commit and push local changes (owner only)
/// Each step's output is appended to one status message as it completes;
/// a step reporting fatal/error halts the sequence
pub async fn push(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }
    let commit_msg = {
        let given = args.message().trim();
        if given.is_empty() { "None given" } else { given }
    };

    let mut report = String::new();
    let mut status = msg
        .channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| e.title("GitHub push").description("Running `git add .`..."))
        })
        .await?;

    let add = run_git(&["add", "."]).await;
    let add_ok = !looks_errored(&add);
    report.push_str(&step_block("Add result", add_ok, &add));
    status
        .edit(&ctx.http, |m| {
            m.embed(|e| e.title("GitHub push").description(&report))
        })
        .await?;
    if !add_ok {
        return Ok(());
    }

    let commit = run_git(&["commit", "-m", commit_msg]).await;
    // "nothing to commit" is a no-op, not a failure
    let commit_ok = !looks_errored(&commit) || commit.contains("nothing to commit");
    report.push_str(&step_block("Commit result", commit_ok, &commit));
    status
        .edit(&ctx.http, |m| {
            m.embed(|e| e.title("GitHub push").description(&report))
        })
        .await?;
    if !commit_ok {
        return Ok(());
    }

    let push = run_git(&["push"]).await;
    report.push_str(&step_block("Push result", !looks_errored(&push), &push));
    status
        .edit(&ctx.http, |m| {
            m.embed(|e| e.title("GitHub push").description(&report))
        })
        .await?;

    Ok(())
}

#[command]
/// ^git pull - hard-reset the checkout and pull the latest changes
/// (owner only)
pub async fn pull(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }

    let reset = run_git(&["reset", "--hard", "HEAD"]).await;
    let pull = run_git(&["pull"]).await;
    let report = format!(
        "{}{}",
        step_block("Reset", !looks_errored(&reset), &reset),
        step_block("Pull", !looks_errored(&pull), &pull)
    );
    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| e.title("GitHub pull output").description(report))
        })
        .await?;

    Ok(())
}

#[command]
#[aliases("rc")]
/// ^reloadconfig - re-read botconfig.txt from disk (owner only)
pub async fn reloadconfig(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }
    match crate::load_bot_config() {
        Ok(config) => {
            log::info!("[OWNER] configuration reloaded ({} keys)", config.len());
            msg.reply(
                ctx,
                format!("Reloaded botconfig.txt (`{}` keys)", config.len()),
            )
            .await?;
        }
        Err(e) => {
            log::error!("[OWNER] configuration reload failed: {}", e);
            msg.reply(ctx, format!("Failed to reload botconfig.txt: {}", e))
                .await?;
        }
    }
    Ok(())
}

#[command]
#[aliases("reboot")]
/// ^restart - restart the bot process (owner only)
/// Spawns a fresh copy of the current executable and exits this one
pub async fn restart(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }
    msg.reply(ctx, "**Restarting the bot...** It should be back in a moment.")
        .await?;
    log::info!(
        "[OWNER] restart requested by {} ({})",
        msg.author.name,
        msg.author.id
    );
    // Give the reply time to go out before the process dies.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    if let Err(e) = restart_process().await {
        log::error!("[OWNER] restart failed: {}", e);
        msg.reply(ctx, format!("Restart failed: {}", e)).await?;
    }
    Ok(())
}

async fn restart_process() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let current_exe = std::env::current_exe()?;
    let current_dir = std::env::current_dir()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut cmd = std::process::Command::new(current_exe);
    cmd.current_dir(current_dir).args(args);
    cmd.spawn()?;

    // The replacement is up; hand over.
    tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
    std::process::exit(0);
}

#[command]
#[aliases("stopbot")]
/// ^shutdown - stop the bot process gracefully (owner only)
pub async fn shutdown(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    if !require_owner(ctx, msg).await? {
        return Ok(());
    }
    msg.reply(ctx, "**Shutting down.** Goodbye!").await?;
    log::info!(
        "[OWNER] shutdown requested by {} ({})",
        msg.author.name,
        msg.author.id
    );
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    std::process::exit(0);
}

// ============================================================================
// COMMAND GROUP
// ============================================================================

#[group]
#[commands(stats, git, reloadconfig, restart, shutdown)]
pub struct Owner;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "`0d, 0h, 0m, 0s`");
        assert_eq!(format_uptime(61), "`0d, 0h, 1m, 1s`");
        // 2 days, 3 hours, 4 minutes, 5 seconds
        assert_eq!(
            format_uptime(2 * 86400 + 3 * 3600 + 4 * 60 + 5),
            "`2d, 3h, 4m, 5s`"
        );
        assert_eq!(format_uptime(-10), "`0d, 0h, 0m, 0s`");
    }

    #[test]
    fn test_looks_errored() {
        assert!(looks_errored("fatal: not a git repository"));
        assert!(looks_errored("error: pathspec 'x' did not match"));
        assert!(!looks_errored("2 files changed, 10 insertions(+)"));
    }

    #[test]
    fn test_clip_truncates_long_output() {
        let short = "ok";
        assert_eq!(clip(short, 10), "ok");
        let long = "x".repeat(50);
        let clipped = clip(&long, 10);
        assert!(clipped.starts_with("xxxxxxxxxx"));
        assert!(clipped.ends_with("[output truncated]"));
    }

    #[test]
    fn test_owner_gate_without_config() {
        // With BOT_OWNER_ID unset nobody is the owner.
        std::env::remove_var("BOT_OWNER_ID");
        assert!(!is_owner(UserId(12345)));
    }
}
