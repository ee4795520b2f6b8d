// pager.rs - Reaction-Driven Help Pager
// This module implements the interactive help session: one page per command
// category, advanced by a small fixed set of navigation reactions until the
// user closes it or it idles out.
//
// Key Features:
// - Pure navigation state machine (wrap-around paging, info overlay, close)
// - Live re-filtering of commands on every render; nothing is cached
// - Cooperative wait loop over injected display/signal traits so the whole
//   session is testable without a gateway connection
//
// Used by: commands/help.rs (serenity adapters and the ^help command)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::{Access, CallerContext, Category, CommandCatalog, CommandEntry};

// ============================================================================
// NAVIGATION SIGNALS & AFFORDANCES
// ============================================================================

/// One navigation signal, each bound to a single reaction emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSignal {
    First,
    Prev,
    Next,
    Last,
    Close,
    Info,
}

impl NavSignal {
    /// Every signal in the order its reaction is attached to the message.
    pub const ALL: [NavSignal; 6] = [
        NavSignal::First,
        NavSignal::Prev,
        NavSignal::Next,
        NavSignal::Last,
        NavSignal::Close,
        NavSignal::Info,
    ];

    /// The reaction emoji representing this signal on the displayed message.
    pub fn affordance(self) -> &'static str {
        match self {
            NavSignal::First => "\u{23EE}",  // track previous
            NavSignal::Prev => "\u{25C0}",   // left triangle
            NavSignal::Next => "\u{25B6}",   // right triangle
            NavSignal::Last => "\u{23ED}",   // track next
            NavSignal::Close => "\u{23F9}",  // stop button
            NavSignal::Info => "\u{2139}",   // information source
        }
    }

    /// Map a raw affordance identifier back to a signal. Anything else is
    /// an unrecognized signal and gets ignored by the session loop.
    pub fn from_affordance(raw: &str) -> Option<NavSignal> {
        // Clients sometimes append U+FE0F to the bare emoji.
        let raw = raw.trim_end_matches('\u{FE0F}');
        NavSignal::ALL.into_iter().find(|s| s.affordance() == raw)
    }
}

// ============================================================================
// PAGE SET & STATE MACHINE
// ============================================================================

/// The ordered categories one session pages over. Fixed for the lifetime of
/// the session; guaranteed non-empty.
#[derive(Debug, Clone)]
pub struct PageSet {
    names: Vec<String>,
}

impl PageSet {
    pub fn new(names: Vec<String>) -> Result<Self, PagerError> {
        if names.is_empty() {
            return Err(PagerError::NoContent);
        }
        Ok(PageSet { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name_at(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Session state: either showing a page or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Active(usize),
    Closed,
}

/// What one accepted signal does to an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Re-render and show the page at this index.
    Goto(usize),
    /// Replace the page with the info overlay; index is unchanged.
    Overlay,
    /// End the session and remove the displayed message.
    Close,
}

/// The navigation transition table. `len` must be non-zero.
///
/// First lands on the final page, same as Last. That mapping is kept on
/// purpose; see DESIGN.md before changing it.
pub fn advance(index: usize, len: usize, signal: NavSignal) -> Step {
    debug_assert!(len > 0 && index < len);
    match signal {
        NavSignal::First => Step::Goto(len - 1),
        NavSignal::Last => Step::Goto(len - 1),
        NavSignal::Prev => Step::Goto(if index == 0 { len - 1 } else { index - 1 }),
        NavSignal::Next => Step::Goto(if index + 1 == len { 0 } else { index + 1 }),
        NavSignal::Info => Step::Overlay,
        NavSignal::Close => Step::Close,
    }
}

// ============================================================================
// RENDERED PAGES
// ============================================================================

/// One embed field: (name, value, inline).
pub type PageField = (String, String, bool);

/// A disposable rendered view of one page. Recomputed on every navigation
/// step so command visibility is always current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: String,
    pub description: String,
    pub author_line: String,
    pub fields: Vec<PageField>,
    pub footer: String,
}

fn no_description() -> String {
    "There is no documentation for this command currently".to_string()
}

/// Invocation signature for a command entry. Top-level commands carry the
/// prefix; sub-commands render bare since they are shown beneath a parent.
pub fn command_signature(entry: &CommandEntry, prefix: &str, is_sub: bool) -> String {
    let head = if is_sub {
        format!("`{}`", entry.name)
    } else {
        format!("`{}{}`", prefix, entry.name)
    };
    if entry.signature.is_empty() {
        head
    } else {
        let args = entry
            .signature
            .split_whitespace()
            .map(|a| format!("`{}`", a))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", head, args)
    }
}

fn entry_description(entry: &CommandEntry) -> String {
    if entry.short_desc.is_empty() {
        no_description()
    } else {
        entry.short_desc.clone()
    }
}

fn footer_hint(prefix: &str) -> String {
    format!("Use \"{}help <command>\" for more info on a command.", prefix)
}

/// Render the page for one category, re-evaluating every command's access
/// rule against the caller. An entry whose check fails outright is skipped
/// on its own; an empty result still renders (with a zero count).
pub fn render_page(
    category: &Category,
    caller: &CallerContext,
    page: usize,
    total: usize,
    prefix: &str,
) -> RenderedPage {
    let mut fields: Vec<PageField> = Vec::new();
    let mut visible = 0usize;
    for entry in &category.commands {
        if entry.access.evaluate(caller) != Access::Allowed {
            continue;
        }
        visible += 1;
        fields.push((
            command_signature(entry, prefix, false),
            entry_description(entry),
            false,
        ));
        for sub in &entry.subcommands {
            if sub.access.evaluate(caller) != Access::Allowed {
                continue;
            }
            visible += 1;
            fields.push((
                format!("**\u{255A}\u{2561}**{}", command_signature(sub, prefix, true)),
                entry_description(sub),
                true,
            ));
        }
    }

    RenderedPage {
        title: format!("Help with {} ({} commands)", category.name, visible),
        description: category.description.clone(),
        author_line: format!("We are currently on page {}/{}", page + 1, total),
        fields,
        footer: footer_hint(prefix),
    }
}

/// The info overlay shown for the Info signal: what the reactions do and how
/// to read argument notation. The category view returns on the next signal.
pub fn render_info(
    bot_name: &str,
    categories: &[String],
    page: usize,
    total: usize,
    prefix: &str,
) -> RenderedPage {
    let loaded = categories
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");
    let fields = vec![
        (
            format!(
                "Currently there are {} categories loaded ({})",
                categories.len(),
                loaded
            ),
            "`<...>` indicates a required argument,\n`[...]` indicates an optional \
             argument.\n\n**Don't however type these around your argument**"
                .to_string(),
            false,
        ),
        (
            "What do the emojis do:".to_string(),
            format!(
                "{} Goes to the first page\n\
                 {} Goes to the previous page\n\
                 {} Goes to the next page\n\
                 {} Goes to the last page\n\
                 {} Deletes and closes this message\n\
                 {} Shows this message",
                NavSignal::First.affordance(),
                NavSignal::Prev.affordance(),
                NavSignal::Next.affordance(),
                NavSignal::Last.affordance(),
                NavSignal::Close.affordance(),
                NavSignal::Info.affordance(),
            ),
            false,
        ),
    ];

    RenderedPage {
        title: format!("Help with {}'s commands", bot_name),
        description: String::new(),
        author_line: format!("You were on page {}/{} before", page + 1, total),
        fields,
        footer: footer_hint(prefix),
    }
}

// ============================================================================
// COLLABORATOR TRAITS & ERRORS
// ============================================================================

/// Errors from the display surface. Permission denials are expected and are
/// swallowed by the session loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("missing permissions on the display surface")]
    Denied,
    #[error("display error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum PagerError {
    #[error("no help categories are visible to you")]
    NoContent,
    #[error("could not display the help page: {0}")]
    Display(#[from] DisplayError),
}

/// Where pages get shown. One implementation talks to Discord; tests use an
/// in-memory fake. Every method may fail with a permission denial the
/// session must tolerate.
#[async_trait]
pub trait DisplaySurface: Send {
    /// Send the first page as a new document.
    async fn show(&mut self, page: &RenderedPage) -> Result<(), DisplayError>;
    /// Replace the displayed document in place.
    async fn edit(&mut self, page: &RenderedPage) -> Result<(), DisplayError>;
    /// Attach the navigation affordances. Fire-and-forget relative to the
    /// wait loop; implementations may spawn.
    async fn attach_controls(&mut self, controls: &[NavSignal]) -> Result<(), DisplayError>;
    /// Clear one user's press of one affordance (best effort).
    async fn acknowledge(&mut self, affordance: &str, user_id: u64) -> Result<(), DisplayError>;
    /// Strip the affordances but leave the content visible.
    async fn clear_controls(&mut self) -> Result<(), DisplayError>;
    /// Remove the displayed document entirely.
    async fn remove(&mut self) -> Result<(), DisplayError>;
}

/// A raw navigation event: which affordance, pressed by whom.
#[derive(Debug, Clone)]
pub struct RawSignal {
    pub affordance: String,
    pub user_id: u64,
}

/// Source of navigation events for one displayed document. `None` means no
/// event arrived within the wait window.
#[async_trait]
pub trait SignalSource: Send {
    async fn next_signal(&mut self, wait: Duration) -> Option<RawSignal>;
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The owner pressed the close control; the message was removed.
    Closed,
    /// Nothing happened within the idle window; controls were stripped.
    Idle,
}

// ============================================================================
// THE SESSION
// ============================================================================

/// One interactive help session. Owns its page set, its state, and the two
/// collaborator handles; concurrent sessions share nothing but the catalog.
pub struct HelpPager<D: DisplaySurface, S: SignalSource> {
    catalog: Arc<CommandCatalog>,
    caller: CallerContext,
    pages: PageSet,
    state: PagerState,
    prefix: String,
    bot_name: String,
    idle: Duration,
    display: D,
    signals: S,
}

impl<D: DisplaySurface, S: SignalSource> HelpPager<D, S> {
    /// Build a session for this caller. Fails with `NoContent` when the
    /// caller cannot see a single category, in which case no message is
    /// ever sent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<CommandCatalog>,
        caller: CallerContext,
        prefix: String,
        bot_name: String,
        idle: Duration,
        display: D,
        signals: S,
    ) -> Result<Self, PagerError> {
        let pages = PageSet::new(catalog.visible_category_names(&caller))?;
        Ok(HelpPager {
            catalog,
            caller,
            pages,
            state: PagerState::Active(0),
            prefix,
            bot_name,
            idle,
            display,
            signals,
        })
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn page_set(&self) -> &PageSet {
        &self.pages
    }

    fn render_index(&self, index: usize) -> RenderedPage {
        let name = self.pages.name_at(index);
        match self.catalog.find_category(name) {
            Some(category) => {
                render_page(category, &self.caller, index, self.pages.len(), &self.prefix)
            }
            // The category vanished from the catalog mid-session; render an
            // empty page rather than dying.
            None => RenderedPage {
                title: format!("Help with {} (0 commands)", name),
                description: String::new(),
                author_line: format!(
                    "We are currently on page {}/{}",
                    index + 1,
                    self.pages.len()
                ),
                fields: Vec::new(),
                footer: footer_hint(&self.prefix),
            },
        }
    }

    /// Drive the session to completion: show the first page, then loop on
    /// next-signal-or-timeout until close or idle.
    pub async fn run(mut self) -> Result<SessionEnd, PagerError> {
        let first = self.render_index(0);
        self.display.show(&first).await?;
        // Races the first wait below on purpose; the loop simply sees no
        // signals until the reactions exist.
        if let Err(e) = self.display.attach_controls(&NavSignal::ALL).await {
            log::warn!("[PAGER] could not attach navigation controls: {}", e);
        }

        loop {
            let index = match self.state {
                PagerState::Active(index) => index,
                PagerState::Closed => unreachable!("closed sessions do not loop"),
            };

            let Some(signal) = self.signals.next_signal(self.idle).await else {
                // Idle timeout: strip the controls, keep the content.
                if let Err(e) = self.display.clear_controls().await {
                    log::warn!("[PAGER] could not clear controls on timeout: {}", e);
                }
                self.state = PagerState::Closed;
                return Ok(SessionEnd::Idle);
            };

            if signal.user_id != self.caller.user_id {
                continue;
            }
            let Some(nav) = NavSignal::from_affordance(&signal.affordance) else {
                continue;
            };
            if let Err(e) = self
                .display
                .acknowledge(&signal.affordance, signal.user_id)
                .await
            {
                log::debug!("[PAGER] could not acknowledge reaction: {}", e);
            }

            match advance(index, self.pages.len(), nav) {
                Step::Goto(next) => {
                    self.state = PagerState::Active(next);
                    let page = self.render_index(next);
                    if let Err(e) = self.display.edit(&page).await {
                        log::warn!("[PAGER] could not update help page: {}", e);
                    }
                }
                Step::Overlay => {
                    let overlay = render_info(
                        &self.bot_name,
                        self.pages.names(),
                        index,
                        self.pages.len(),
                        &self.prefix,
                    );
                    if let Err(e) = self.display.edit(&overlay).await {
                        log::warn!("[PAGER] could not show info overlay: {}", e);
                    }
                }
                Step::Close => {
                    if let Err(e) = self.display.remove().await {
                        log::warn!("[PAGER] could not remove help message: {}", e);
                    }
                    self.state = PagerState::Closed;
                    return Ok(SessionEnd::Closed);
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AccessRule, Category, CommandCatalog, CommandEntry};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn caller() -> CallerContext {
        CallerContext {
            user_id: 7,
            is_owner: false,
            in_guild: true,
        }
    }

    fn abc_catalog() -> Arc<CommandCatalog> {
        let make = |name: &str| {
            Category::new(name, "test category")
                .command(CommandEntry::new("one", "", "first command"))
                .command(CommandEntry::new("two", "<arg>", "second command"))
        };
        Arc::new(CommandCatalog::new(vec![make("A"), make("B"), make("C")]))
    }

    // ------------------------------------------------------------------
    // state machine
    // ------------------------------------------------------------------

    #[test]
    fn test_next_cycles_back_to_start() {
        for len in 1..6 {
            let mut index = 0;
            for _ in 0..len {
                match advance(index, len, NavSignal::Next) {
                    Step::Goto(next) => index = next,
                    other => panic!("unexpected step {:?}", other),
                }
            }
            assert_eq!(index, 0, "len {}", len);
        }
    }

    #[test]
    fn test_wrap_at_both_ends() {
        for len in 1..6 {
            assert_eq!(advance(0, len, NavSignal::Prev), Step::Goto(len - 1));
            assert_eq!(advance(len - 1, len, NavSignal::Next), Step::Goto(0));
        }
    }

    #[test]
    fn test_first_and_last_idempotent() {
        // Both land on the final page; applying either twice matches once.
        let len = 5;
        for signal in [NavSignal::First, NavSignal::Last] {
            let Step::Goto(once) = advance(2, len, signal) else {
                panic!("expected a page step");
            };
            let Step::Goto(twice) = advance(once, len, signal) else {
                panic!("expected a page step");
            };
            assert_eq!(once, len - 1);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_scenario_a_b_c() {
        let len = 3;
        let mut index = 0;
        for _ in 0..3 {
            if let Step::Goto(next) = advance(index, len, NavSignal::Next) {
                index = next;
            }
        }
        assert_eq!(index, 0);
        assert_eq!(advance(0, len, NavSignal::Prev), Step::Goto(2));
        assert_eq!(advance(1, len, NavSignal::Last), Step::Goto(2));
        assert_eq!(advance(1, len, NavSignal::First), Step::Goto(2));
        assert_eq!(advance(1, len, NavSignal::Info), Step::Overlay);
        assert_eq!(advance(1, len, NavSignal::Close), Step::Close);
    }

    #[test]
    fn test_empty_page_set_rejected() {
        assert!(matches!(
            PageSet::new(Vec::new()),
            Err(PagerError::NoContent)
        ));
    }

    #[test]
    fn test_affordance_round_trip() {
        for signal in NavSignal::ALL {
            assert_eq!(NavSignal::from_affordance(signal.affordance()), Some(signal));
        }
        // Variation selector suffix still resolves.
        assert_eq!(
            NavSignal::from_affordance("\u{2139}\u{FE0F}"),
            Some(NavSignal::Info)
        );
        assert_eq!(NavSignal::from_affordance("x"), None);
    }

    // ------------------------------------------------------------------
    // rendering
    // ------------------------------------------------------------------

    #[test]
    fn test_failing_check_skips_only_that_entry() {
        let category = Category::new("A", "three commands, one broken")
            .command(CommandEntry::new("good", "", "works"))
            .command(
                CommandEntry::new("broken", "", "check explodes")
                    .access(AccessRule::Check(Arc::new(|_| Err("boom".to_string())))),
            )
            .command(CommandEntry::new("fine", "<x>", "also works"));
        let page = render_page(&category, &caller(), 0, 1, "^");
        assert_eq!(page.fields.len(), 2);
        assert_eq!(page.title, "Help with A (2 commands)");
    }

    #[test]
    fn test_empty_category_still_renders() {
        let category = Category::new("Empty", "nothing here").command(
            CommandEntry::new("hidden", "", "owner only").access(AccessRule::OwnerOnly),
        );
        let page = render_page(&category, &caller(), 0, 2, "^");
        assert_eq!(page.title, "Help with Empty (0 commands)");
        assert!(page.fields.is_empty());
    }

    #[test]
    fn test_subcommands_render_nested() {
        let category = Category::new("Owner", "admin").command(
            CommandEntry::new("git", "<push|pull>", "git wrapper")
                .subcommand(CommandEntry::new("push", "[message]", "push changes")),
        );
        let page = render_page(&category, &caller(), 0, 1, "^");
        assert_eq!(page.fields.len(), 2);
        assert_eq!(page.fields[0].0, "`^git` `<push|pull>`");
        assert!(page.fields[1].0.starts_with("**\u{255A}\u{2561}**`push`"));
        assert!(page.fields[1].2, "sub-commands render inline");
    }

    #[test]
    fn test_footer_carries_prefix_hint() {
        let page = render_info("TestBot", &["A".to_string()], 0, 1, "^");
        assert!(page.footer.contains("^help <command>"));
        assert!(page.author_line.contains("page 1/1"));
    }

    // ------------------------------------------------------------------
    // session loop
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct FakeDisplay {
        log: Mutex<Vec<String>>,
        controls_cleared: bool,
        removed: bool,
        fail_edits: bool,
    }

    impl FakeDisplay {
        fn titles(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DisplaySurface for &mut FakeDisplay {
        async fn show(&mut self, page: &RenderedPage) -> Result<(), DisplayError> {
            self.log.lock().unwrap().push(format!("show:{}", page.title));
            Ok(())
        }

        async fn edit(&mut self, page: &RenderedPage) -> Result<(), DisplayError> {
            if self.fail_edits {
                return Err(DisplayError::Denied);
            }
            self.log.lock().unwrap().push(format!("edit:{}", page.title));
            Ok(())
        }

        async fn attach_controls(&mut self, _: &[NavSignal]) -> Result<(), DisplayError> {
            Ok(())
        }

        async fn acknowledge(&mut self, _: &str, _: u64) -> Result<(), DisplayError> {
            // Permission denial here must never stop a transition.
            Err(DisplayError::Denied)
        }

        async fn clear_controls(&mut self) -> Result<(), DisplayError> {
            self.controls_cleared = true;
            Ok(())
        }

        async fn remove(&mut self) -> Result<(), DisplayError> {
            self.removed = true;
            Ok(())
        }
    }

    struct ScriptedSignals {
        events: VecDeque<RawSignal>,
    }

    impl ScriptedSignals {
        fn new(events: Vec<(&str, u64)>) -> Self {
            ScriptedSignals {
                events: events
                    .into_iter()
                    .map(|(affordance, user_id)| RawSignal {
                        affordance: affordance.to_string(),
                        user_id,
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl SignalSource for ScriptedSignals {
        async fn next_signal(&mut self, _wait: Duration) -> Option<RawSignal> {
            self.events.pop_front()
        }
    }

    fn pager<'a>(
        display: &'a mut FakeDisplay,
        signals: ScriptedSignals,
    ) -> HelpPager<&'a mut FakeDisplay, ScriptedSignals> {
        HelpPager::new(
            abc_catalog(),
            caller(),
            "^".to_string(),
            "TestBot".to_string(),
            Duration::from_millis(10),
            display,
            signals,
        )
        .expect("three visible categories")
    }

    #[tokio::test]
    async fn test_session_pages_and_wraps() {
        let mut display = FakeDisplay::default();
        let next = NavSignal::Next.affordance();
        let signals = ScriptedSignals::new(vec![(next, 7), (next, 7), (next, 7)]);
        let end = pager(&mut display, signals).run().await.unwrap();
        assert_eq!(end, SessionEnd::Idle);
        assert_eq!(
            display.titles(),
            vec![
                "show:Help with A (2 commands)",
                "edit:Help with B (2 commands)",
                "edit:Help with C (2 commands)",
                "edit:Help with A (2 commands)",
            ]
        );
        assert!(display.controls_cleared);
        assert!(!display.removed, "idle timeout keeps the content");
    }

    #[tokio::test]
    async fn test_wrong_user_and_unknown_affordance_ignored() {
        let mut display = FakeDisplay::default();
        let signals = ScriptedSignals::new(vec![
            (NavSignal::Next.affordance(), 999), // not the session owner
            ("bogus", 7),                        // unrecognized affordance
        ]);
        let end = pager(&mut display, signals).run().await.unwrap();
        assert_eq!(end, SessionEnd::Idle);
        // Only the initial page; no re-render happened.
        assert_eq!(display.titles().len(), 1);
    }

    #[tokio::test]
    async fn test_close_removes_the_message() {
        let mut display = FakeDisplay::default();
        let signals = ScriptedSignals::new(vec![(NavSignal::Close.affordance(), 7)]);
        let end = pager(&mut display, signals).run().await.unwrap();
        assert_eq!(end, SessionEnd::Closed);
        assert!(display.removed);
        assert!(!display.controls_cleared);
    }

    #[tokio::test]
    async fn test_info_overlay_then_navigation_restores_pages() {
        let mut display = FakeDisplay::default();
        let signals = ScriptedSignals::new(vec![
            (NavSignal::Info.affordance(), 7),
            (NavSignal::Next.affordance(), 7),
        ]);
        pager(&mut display, signals).run().await.unwrap();
        let titles = display.titles();
        assert_eq!(titles[1], "edit:Help with TestBot's commands");
        assert_eq!(titles[2], "edit:Help with B (2 commands)");
    }

    #[tokio::test]
    async fn test_failed_edit_keeps_session_alive() {
        let mut display = FakeDisplay {
            fail_edits: true,
            ..FakeDisplay::default()
        };
        let signals = ScriptedSignals::new(vec![
            (NavSignal::Next.affordance(), 7),
            (NavSignal::Close.affordance(), 7),
        ]);
        let end = pager(&mut display, signals).run().await.unwrap();
        // Edit was denied but the session still took the close signal.
        assert_eq!(end, SessionEnd::Closed);
        assert!(display.removed);
    }

    #[tokio::test]
    async fn test_no_visible_categories_never_starts() {
        let catalog = Arc::new(CommandCatalog::new(vec![Category::new(
            "Owner",
            "hidden from everyone else",
        )
        .access(AccessRule::OwnerOnly)]));
        let mut display = FakeDisplay::default();
        let result = HelpPager::new(
            catalog,
            caller(),
            "^".to_string(),
            "TestBot".to_string(),
            Duration::from_millis(10),
            &mut display,
            ScriptedSignals::new(Vec::new()),
        );
        assert!(matches!(result, Err(PagerError::NoContent)));
        assert!(display.titles().is_empty(), "nothing was ever displayed");
    }
}
