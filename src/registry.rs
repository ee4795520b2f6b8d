// registry.rs - Command Catalog Module
// This module describes every command the bot exposes so the help system can
// page over them without reaching into the framework internals.
//
// Key Features:
// - Categories ("cogs") with an ordered list of commands and sub-commands
// - Per-command access rules evaluated live against the calling user
// - Tri-state access results so a failing check is distinguishable from a
//   plain denial (a failing check skips one entry, never the whole page)
//
// Used by: pager.rs (page rendering), commands/help.rs (topic lookup)

use std::sync::Arc;

// ============================================================================
// CALLER CONTEXT & ACCESS EVALUATION
// ============================================================================

/// Snapshot of the calling user taken at render time.
/// Rebuilt on every render so authorization is never stale.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext {
    pub user_id: u64,
    pub is_owner: bool,
    pub in_guild: bool,
}

/// Outcome of evaluating an access rule for one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The caller may see and run the command.
    Allowed,
    /// The rule evaluated cleanly and said no.
    Denied,
    /// The rule itself blew up; the entry is skipped, nothing else aborts.
    Failed,
}

type CheckFn = dyn Fn(&CallerContext) -> Result<bool, String> + Send + Sync;

/// Who is allowed to see a command or category.
#[derive(Clone)]
pub enum AccessRule {
    Everyone,
    OwnerOnly,
    GuildOnly,
    /// Arbitrary predicate. An `Err` from the predicate maps to
    /// `Access::Failed` rather than tearing the render down.
    Check(Arc<CheckFn>),
}

impl AccessRule {
    pub fn evaluate(&self, caller: &CallerContext) -> Access {
        match self {
            AccessRule::Everyone => Access::Allowed,
            AccessRule::OwnerOnly => {
                if caller.is_owner {
                    Access::Allowed
                } else {
                    Access::Denied
                }
            }
            AccessRule::GuildOnly => {
                if caller.in_guild {
                    Access::Allowed
                } else {
                    Access::Denied
                }
            }
            AccessRule::Check(check) => match check(caller) {
                Ok(true) => Access::Allowed,
                Ok(false) => Access::Denied,
                Err(e) => {
                    log::debug!("[REGISTRY] access check failed: {}", e);
                    Access::Failed
                }
            },
        }
    }
}

impl std::fmt::Debug for AccessRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessRule::Everyone => write!(f, "Everyone"),
            AccessRule::OwnerOnly => write!(f, "OwnerOnly"),
            AccessRule::GuildOnly => write!(f, "GuildOnly"),
            AccessRule::Check(_) => write!(f, "Check(..)"),
        }
    }
}

// ============================================================================
// CATALOG TYPES
// ============================================================================

/// One command entry, including any nested sub-commands.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub name: String,
    /// Argument portion of the invocation, e.g. "<text>" or "[message]".
    pub signature: String,
    pub short_desc: String,
    pub long_desc: Option<String>,
    pub aliases: Vec<String>,
    pub subcommands: Vec<CommandEntry>,
    pub access: AccessRule,
}

impl CommandEntry {
    pub fn new(name: &str, signature: &str, short_desc: &str) -> Self {
        CommandEntry {
            name: name.to_string(),
            signature: signature.to_string(),
            short_desc: short_desc.to_string(),
            long_desc: None,
            aliases: Vec::new(),
            subcommands: Vec::new(),
            access: AccessRule::Everyone,
        }
    }

    pub fn long_desc(mut self, desc: &str) -> Self {
        self.long_desc = Some(desc.to_string());
        self
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn subcommand(mut self, sub: CommandEntry) -> Self {
        self.subcommands.push(sub);
        self
    }

    pub fn access(mut self, rule: AccessRule) -> Self {
        self.access = rule;
        self
    }

    /// True if `needle` matches the command name or one of its aliases.
    pub fn answers_to(&self, needle: &str) -> bool {
        self.name.eq_ignore_ascii_case(needle)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(needle))
    }
}

/// A named grouping of related commands. Order of `commands` is the order
/// they render in.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub commands: Vec<CommandEntry>,
    pub access: AccessRule,
}

impl Category {
    pub fn new(name: &str, description: &str) -> Self {
        Category {
            name: name.to_string(),
            description: description.to_string(),
            commands: Vec::new(),
            access: AccessRule::Everyone,
        }
    }

    pub fn command(mut self, entry: CommandEntry) -> Self {
        self.commands.push(entry);
        self
    }

    pub fn access(mut self, rule: AccessRule) -> Self {
        self.access = rule;
        self
    }
}

/// The full, process-wide command catalog. Built once at startup and shared
/// behind an `Arc`; the help system only ever reads it.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    categories: Vec<Category>,
}

impl CommandCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        CommandCatalog { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Names of the categories this caller is authorized to view, in
    /// catalog order. A category whose own check fails is treated the same
    /// as a denied one.
    pub fn visible_category_names(&self, caller: &CallerContext) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| c.access.evaluate(caller) == Access::Allowed)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Look up a top-level command (or one of its aliases) anywhere in the
    /// catalog, returning the owning category as well.
    pub fn find_command(&self, name: &str) -> Option<(&Category, &CommandEntry)> {
        for category in &self.categories {
            for entry in &category.commands {
                if entry.answers_to(name) {
                    return Some((category, entry));
                }
            }
        }
        None
    }

    /// Total number of commands, sub-commands included.
    pub fn command_count(&self) -> usize {
        fn count(entries: &[CommandEntry]) -> usize {
            entries.len() + entries.iter().map(|e| count(&e.subcommands)).sum::<usize>()
        }
        self.categories.iter().map(|c| count(&c.commands)).sum()
    }

    /// Closest command names to a topic nobody recognized, best first.
    /// Prefix matches beat substring matches; at most `limit` results.
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<String> {
        let needle = input.to_lowercase();
        let mut prefix_hits = Vec::new();
        let mut substring_hits = Vec::new();
        for category in &self.categories {
            for entry in &category.commands {
                let name = entry.name.to_lowercase();
                if name.starts_with(&needle) {
                    prefix_hits.push(entry.name.clone());
                } else if name.contains(&needle) || needle.contains(&name) {
                    substring_hits.push(entry.name.clone());
                }
            }
        }
        prefix_hits.extend(substring_hits);
        prefix_hits.truncate(limit);
        prefix_hits
    }
}

// ============================================================================
// DEFAULT CATALOG
// ============================================================================

/// The catalog describing the commands this bot actually registers.
/// Keep in sync with the groups in main.rs.
pub fn default_catalog() -> CommandCatalog {
    let general = Category::new("General", "Everyday commands anyone can use")
        .command(
            CommandEntry::new("ping", "", "Measure the bot's response time")
                .long_desc("Replies with the round-trip latency of a single message edit."),
        )
        .command(
            CommandEntry::new("echo", "<text>", "Repeat the provided text back")
                .long_desc("Echoes your input verbatim. Handy for checking the bot is alive."),
        );

    let help = Category::new("Help", "The help system itself")
        .command(
            CommandEntry::new("help", "[command]", "Browse commands by category")
                .long_desc(
                    "Without arguments, opens a reaction-driven pager over every \
                     category you can see. With a command or category name, shows \
                     detailed help for that topic.",
                )
                .aliases(&["h", "commands"]),
        );

    let owner = Category::new("Owner", "Administration commands for the bot owner")
        .access(AccessRule::OwnerOnly)
        .command(
            CommandEntry::new("stats", "", "Show runtime statistics about the bot")
                .long_desc("Uptime, cached guild/user counts and the latest git commits.")
                .aliases(&["info"])
                .access(AccessRule::OwnerOnly),
        )
        .command(
            CommandEntry::new("git", "<push|pull>", "Run git against the bot's checkout")
                .access(AccessRule::OwnerOnly)
                .subcommand(
                    CommandEntry::new("push", "[message]", "Stage, commit and push local changes")
                        .access(AccessRule::OwnerOnly),
                )
                .subcommand(
                    CommandEntry::new("pull", "", "Hard-reset and pull the latest changes")
                        .access(AccessRule::OwnerOnly),
                ),
        )
        .command(
            CommandEntry::new("reloadconfig", "", "Re-read botconfig.txt from disk")
                .aliases(&["rc"])
                .access(AccessRule::OwnerOnly),
        )
        .command(
            CommandEntry::new("restart", "", "Restart the bot process")
                .aliases(&["reboot"])
                .access(AccessRule::OwnerOnly),
        )
        .command(
            CommandEntry::new("shutdown", "", "Stop the bot process")
                .aliases(&["stopbot"])
                .access(AccessRule::OwnerOnly),
        );

    CommandCatalog::new(vec![general, help, owner])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_owner: bool) -> CallerContext {
        CallerContext {
            user_id: 42,
            is_owner,
            in_guild: true,
        }
    }

    #[test]
    fn test_access_tri_state() {
        let ctx = caller(false);
        assert_eq!(AccessRule::Everyone.evaluate(&ctx), Access::Allowed);
        assert_eq!(AccessRule::OwnerOnly.evaluate(&ctx), Access::Denied);
        assert_eq!(AccessRule::OwnerOnly.evaluate(&caller(true)), Access::Allowed);

        let boom = AccessRule::Check(Arc::new(|_| Err("check exploded".to_string())));
        assert_eq!(boom.evaluate(&ctx), Access::Failed);

        let nope = AccessRule::Check(Arc::new(|_| Ok(false)));
        assert_eq!(nope.evaluate(&ctx), Access::Denied);
    }

    #[test]
    fn test_owner_category_hidden_from_regular_users() {
        let catalog = default_catalog();
        let visible = catalog.visible_category_names(&caller(false));
        assert!(visible.contains(&"General".to_string()));
        assert!(!visible.contains(&"Owner".to_string()));

        let all = catalog.visible_category_names(&caller(true));
        assert!(all.contains(&"Owner".to_string()));
    }

    #[test]
    fn test_find_command_by_alias() {
        let catalog = default_catalog();
        let (category, entry) = catalog.find_command("h").expect("alias should resolve");
        assert_eq!(category.name, "Help");
        assert_eq!(entry.name, "help");
    }

    #[test]
    fn test_suggest_prefers_prefix_matches() {
        let catalog = default_catalog();
        let hits = catalog.suggest("pi", 2);
        assert_eq!(hits.first().map(String::as_str), Some("ping"));

        let none = catalog.suggest("zzzz", 2);
        assert!(none.is_empty());
    }

    #[test]
    fn test_command_count_includes_subcommands() {
        let catalog = default_catalog();
        // ping, echo, help, stats, git (+push +pull), reloadconfig, restart,
        // shutdown
        assert_eq!(catalog.command_count(), 10);
    }
}
