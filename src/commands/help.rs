// help.rs - Paginated Help Command Module
// This module wires the reaction pager (pager.rs) to Discord: it renders
// pages as embeds, attaches the navigation reactions, and forwards reaction
// presses back into the session loop. It also answers `^help <topic>` with a
// detail embed for a single command or category.
//
// Used by: commands/mod.rs (Help group)

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::{
    builder::CreateEmbed,
    client::Context,
    collector::ReactionAction,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    http::HttpError,
    model::channel::{Message, ReactionType},
    model::id::{ChannelId, MessageId, UserId},
    utils::Colour,
};
use tokio::sync::Mutex;

use crate::pager::{
    render_page, DisplayError, HelpPager, NavSignal, PagerError, RawSignal, RenderedPage,
    SignalSource,
};
use crate::registry::{Access, CallerContext, Category, CommandCatalog, CommandEntry};

/// How long a pager session waits for a reaction before idling out.
const DEFAULT_IDLE_SECS: u64 = 90;

// ============================================================================
// DISCORD ADAPTERS
// ============================================================================

/// Handle to the message a session is displaying. Shared between the display
/// surface and the signal source so the reaction collector knows which
/// message to watch once the first page goes out.
type MessageHandle = Arc<Mutex<Option<Message>>>;

fn apply_page<'a>(embed: &'a mut CreateEmbed, page: &RenderedPage) -> &'a mut CreateEmbed {
    embed.title(&page.title);
    if !page.description.is_empty() {
        embed.description(&page.description);
    }
    if !page.author_line.is_empty() {
        embed.author(|a| a.name(&page.author_line));
    }
    for (name, value, inline) in &page.fields {
        embed.field(name, value, *inline);
    }
    if !page.footer.is_empty() {
        embed.footer(|f| f.text(&page.footer));
    }
    embed.colour(Colour::BLURPLE);
    embed
}

fn classify(err: serenity::Error) -> DisplayError {
    if let serenity::Error::Http(ref http) = err {
        if let HttpError::UnsuccessfulRequest(ref response) = **http {
            if response.status_code.as_u16() == 403 {
                return DisplayError::Denied;
            }
        }
    }
    DisplayError::Other(err.to_string())
}

/// Displays pages as a single embed message that gets edited in place.
struct EmbedDisplay<'a> {
    ctx: &'a Context,
    channel_id: ChannelId,
    handle: MessageHandle,
}

impl EmbedDisplay<'_> {
    async fn ids(&self) -> Option<(ChannelId, MessageId)> {
        let guard = self.handle.lock().await;
        guard.as_ref().map(|m| (m.channel_id, m.id))
    }
}

#[async_trait]
impl crate::pager::DisplaySurface for EmbedDisplay<'_> {
    async fn show(&mut self, page: &RenderedPage) -> Result<(), DisplayError> {
        let sent = self
            .channel_id
            .send_message(&self.ctx.http, |m| m.embed(|e| apply_page(e, page)))
            .await
            .map_err(classify)?;
        *self.handle.lock().await = Some(sent);
        Ok(())
    }

    async fn edit(&mut self, page: &RenderedPage) -> Result<(), DisplayError> {
        let mut guard = self.handle.lock().await;
        match guard.as_mut() {
            Some(message) => message
                .edit(&self.ctx.http, |m| m.embed(|e| apply_page(e, page)))
                .await
                .map_err(classify),
            None => Err(DisplayError::Other("no displayed message".to_string())),
        }
    }

    async fn attach_controls(&mut self, controls: &[NavSignal]) -> Result<(), DisplayError> {
        let Some((channel_id, message_id)) = self.ids().await else {
            return Ok(());
        };
        let http = Arc::clone(&self.ctx.http);
        let controls = controls.to_vec();
        // Fire-and-forget so the session can start waiting for reactions
        // while these are still being attached.
        tokio::spawn(async move {
            for control in controls {
                let emoji = ReactionType::Unicode(control.affordance().to_string());
                if let Err(e) = channel_id.create_reaction(&http, message_id, emoji).await {
                    log::debug!(
                        "[HELP] could not attach {} control: {}",
                        control.affordance(),
                        e
                    );
                    break;
                }
            }
        });
        Ok(())
    }

    async fn acknowledge(&mut self, affordance: &str, user_id: u64) -> Result<(), DisplayError> {
        let Some((channel_id, message_id)) = self.ids().await else {
            return Ok(());
        };
        channel_id
            .delete_reaction(
                &self.ctx.http,
                message_id,
                Some(UserId(user_id)),
                ReactionType::Unicode(affordance.to_string()),
            )
            .await
            .map_err(classify)
    }

    async fn clear_controls(&mut self) -> Result<(), DisplayError> {
        let guard = self.handle.lock().await;
        match guard.as_ref() {
            Some(message) => message
                .delete_reactions(&self.ctx.http)
                .await
                .map_err(classify),
            None => Ok(()),
        }
    }

    async fn remove(&mut self) -> Result<(), DisplayError> {
        let mut guard = self.handle.lock().await;
        match guard.take() {
            Some(message) => message.delete(&self.ctx.http).await.map_err(classify),
            None => Ok(()),
        }
    }
}

/// Feeds reaction presses on the displayed message into the session loop.
struct ReactionSignals<'a> {
    ctx: &'a Context,
    handle: MessageHandle,
}

#[async_trait]
impl SignalSource for ReactionSignals<'_> {
    async fn next_signal(&mut self, wait: Duration) -> Option<RawSignal> {
        let message = {
            let guard = self.handle.lock().await;
            guard.clone()
        };
        let Some(message) = message else {
            // Nothing is displayed yet; there is nothing to watch.
            tokio::time::sleep(wait).await;
            return None;
        };

        let action = message.await_reaction(self.ctx).timeout(wait).await?;
        let reaction = match action.as_ref() {
            ReactionAction::Added(reaction) => Arc::clone(reaction),
            // The collector only watches additions; map anything else to a
            // press from nobody so the loop drops it.
            ReactionAction::Removed(_) => {
                return Some(RawSignal {
                    affordance: String::new(),
                    user_id: 0,
                })
            }
        };
        let affordance = match &reaction.emoji {
            ReactionType::Unicode(s) => s.clone(),
            other => other.to_string(),
        };
        Some(RawSignal {
            affordance,
            user_id: reaction.user_id.map(|u| u.0).unwrap_or(0),
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn command_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| "^".to_string())
}

fn idle_window() -> Duration {
    let secs = env::var("HELP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_IDLE_SECS);
    Duration::from_secs(secs)
}

fn caller_context(msg: &Message) -> CallerContext {
    CallerContext {
        user_id: msg.author.id.0,
        is_owner: super::owner::is_owner(msg.author.id),
        in_guild: msg.guild_id.is_some(),
    }
}

async fn send_embed(
    ctx: &Context,
    channel_id: ChannelId,
    page: &RenderedPage,
) -> serenity::Result<Message> {
    channel_id
        .send_message(&ctx.http, |m| m.embed(|e| apply_page(e, page)))
        .await
}

fn alias_note(aliases: &[String]) -> String {
    if aliases.is_empty() {
        String::new()
    } else {
        format!("command aliases are [`{}`]", aliases.join("` | `"))
    }
}

fn long_description(entry: &CommandEntry) -> String {
    if let Some(desc) = &entry.long_desc {
        return desc.clone();
    }
    if !entry.short_desc.is_empty() {
        return entry.short_desc.clone();
    }
    "There is currently no documentation for this command".to_string()
}

/// Detail page for one command, including its visible sub-commands.
fn command_detail_page(
    category: &Category,
    entry: &CommandEntry,
    caller: &CallerContext,
    prefix: &str,
) -> RenderedPage {
    let signature = crate::pager::command_signature(entry, prefix, false);
    let name_line = if entry.aliases.is_empty() {
        signature
    } else {
        format!("{} {}", signature, alias_note(&entry.aliases))
    };
    let mut fields = vec![(name_line, long_description(entry), false)];
    for sub in &entry.subcommands {
        if sub.access.evaluate(caller) != Access::Allowed {
            continue;
        }
        fields.push((
            format!(
                "**\u{255A}\u{2561}**{}",
                crate::pager::command_signature(sub, prefix, true)
            ),
            long_description(sub),
            false,
        ));
    }

    RenderedPage {
        title: format!("Help with `{}`", entry.name),
        description: String::new(),
        author_line: format!(
            "We are currently looking at the {} category and its command {}",
            category.name, entry.name
        ),
        fields,
        footer: format!("Use \"{}help <command>\" for more info on a command.", prefix),
    }
}

/// Reply for an unknown help topic: closest command names plus the
/// categories the caller can actually see.
fn not_found_page(catalog: &CommandCatalog, caller: &CallerContext, topic: &str) -> RenderedPage {
    let mut description = format!(
        "**Error 404:** Command or category \"{}\" not found \u{00AF}\\_(\u{30C4})_/\u{00AF}",
        topic
    );
    let suggestions = catalog.suggest(topic, 2);
    if !suggestions.is_empty() {
        let joined = suggestions
            .iter()
            .map(|s| format!("`{}`", s))
            .collect::<Vec<_>>()
            .join("\n");
        description.push_str(&format!("\nPerhaps you meant:\n{}", joined));
    }
    let visible = catalog
        .visible_category_names(caller)
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");

    RenderedPage {
        title: "Error!".to_string(),
        description,
        author_line: String::new(),
        fields: vec![(
            "The currently loaded categories are".to_string(),
            if visible.is_empty() {
                "(none)".to_string()
            } else {
                visible
            },
            false,
        )],
        footer: String::new(),
    }
}

async fn topic_help(
    ctx: &Context,
    msg: &Message,
    catalog: &CommandCatalog,
    caller: &CallerContext,
    prefix: &str,
    topic: &str,
) -> CommandResult {
    if let Some((category, entry)) = catalog.find_command(topic) {
        // Denied or failing checks fall through to not-found so hidden
        // commands stay hidden.
        if entry.access.evaluate(caller) == Access::Allowed {
            let page = command_detail_page(category, entry, caller, prefix);
            send_embed(ctx, msg.channel_id, &page).await?;
            return Ok(());
        }
    }

    if let Some(category) = catalog.find_category(topic) {
        if category.access.evaluate(caller) == Access::Allowed {
            let mut page = render_page(category, caller, 0, 1, prefix);
            page.author_line = format!(
                "We are currently looking at the {} category and its commands",
                category.name
            );
            send_embed(ctx, msg.channel_id, &page).await?;
            return Ok(());
        }
    }

    let page = not_found_page(catalog, caller, topic);
    send_embed(ctx, msg.channel_id, &page).await?;
    Ok(())
}

// ============================================================================
// COMMAND IMPLEMENTATION
// ============================================================================

#[command]
#[aliases("h", "commands")]
/// Main ^help command handler
/// Without arguments, starts a reaction-paginated browse session over every
/// category the caller can see. With an argument, shows detail help for
/// that command or category.
pub async fn help(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let catalog = {
        let data = ctx.data.read().await;
        data.get::<crate::CatalogKey>().cloned()
    };
    let Some(catalog) = catalog else {
        msg.reply(ctx, "Help is not available right now.").await?;
        return Ok(());
    };

    let prefix = command_prefix();
    let caller = caller_context(msg);

    let topic = args.message().trim();
    if !topic.is_empty() {
        return topic_help(ctx, msg, &catalog, &caller, &prefix, topic).await;
    }

    let bot_name = ctx.cache.current_user().name;
    let handle: MessageHandle = Arc::new(Mutex::new(None));
    let display = EmbedDisplay {
        ctx,
        channel_id: msg.channel_id,
        handle: Arc::clone(&handle),
    };
    let signals = ReactionSignals {
        ctx,
        handle: Arc::clone(&handle),
    };

    match HelpPager::new(
        Arc::clone(&catalog),
        caller,
        prefix,
        bot_name,
        idle_window(),
        display,
        signals,
    ) {
        Ok(pager) => match pager.run().await {
            Ok(end) => {
                log::info!(
                    "[HELP] pager session for {} ended: {:?}",
                    msg.author.id,
                    end
                );
            }
            Err(e) => {
                log::warn!("[HELP] pager session failed: {}", e);
                msg.reply(ctx, "I couldn't display the help menu here.")
                    .await?;
            }
        },
        Err(PagerError::NoContent) => {
            msg.reply(ctx, "There are no help categories visible to you.")
                .await?;
        }
        Err(e) => {
            log::warn!("[HELP] could not start pager session: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// COMMAND GROUP
// ============================================================================

#[group]
#[commands(help)]
pub struct Help;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AccessRule;

    fn caller() -> CallerContext {
        CallerContext {
            user_id: 1,
            is_owner: false,
            in_guild: true,
        }
    }

    #[test]
    fn test_alias_note_formatting() {
        assert_eq!(alias_note(&[]), "");
        let aliases = vec!["h".to_string(), "commands".to_string()];
        assert_eq!(
            alias_note(&aliases),
            "command aliases are [`h` | `commands`]"
        );
    }

    #[test]
    fn test_command_detail_hides_denied_subcommands() {
        let category = Category::new("Owner", "admin");
        let entry = CommandEntry::new("git", "<push|pull>", "git wrapper")
            .subcommand(CommandEntry::new("push", "[message]", "push changes"))
            .subcommand(
                CommandEntry::new("secret", "", "owner only").access(AccessRule::OwnerOnly),
            );
        let page = command_detail_page(&category, &entry, &caller(), "^");
        // Parent plus one visible sub-command.
        assert_eq!(page.fields.len(), 2);
        assert!(page.fields[1].0.contains("`push`"));
    }

    #[test]
    fn test_long_description_fallbacks() {
        let documented = CommandEntry::new("a", "", "short").long_desc("long");
        assert_eq!(long_description(&documented), "long");
        let brief_only = CommandEntry::new("b", "", "short");
        assert_eq!(long_description(&brief_only), "short");
        let bare = CommandEntry::new("c", "", "");
        assert!(long_description(&bare).contains("no documentation"));
    }

    #[test]
    fn test_not_found_page_lists_visible_categories() {
        let catalog = crate::registry::default_catalog();
        let page = not_found_page(&catalog, &caller(), "pnig");
        assert!(page.description.contains("\"pnig\" not found"));
        let (_, categories, _) = &page.fields[0];
        assert!(categories.contains("`General`"));
        assert!(!categories.contains("`Owner`"));
    }
}
