//! Keybinding registry: maps key events to actions per focus context.
//!
//! Post-specific keys (read state, saving, opening) are bound in the Posts
//! context only, so pressing them with the category pane focused does
//! nothing.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    ToggleFocus,
    Select,
    ToggleSort,
    Refresh,
    MarkUnread,
    MarkRead,
    MarkSaved,
    MarkUnsaved,
    OpenPlainText,
    OpenInBrowser,
    AddSubscription,
    MarkCategoryRead,
}

impl Action {
    /// Human-readable description, used in debug logging.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::ToggleFocus => "Switch pane focus",
            Self::Select => "Fetch stream / preview post",
            Self::ToggleSort => "Toggle ranked order",
            Self::Refresh => "Reload current category",
            Self::MarkUnread => "Mark post unread",
            Self::MarkRead => "Mark post read",
            Self::MarkSaved => "Mark post saved",
            Self::MarkUnsaved => "Mark post unsaved",
            Self::OpenPlainText => "Open in text browser",
            Self::OpenInBrowser => "Open in desktop browser",
            Self::AddSubscription => "Add subscription",
            Self::MarkCategoryRead => "Mark category read",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context. Determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Categories,
    Posts,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings.
///
/// The same key can map to different actions in different contexts. Lookup
/// tries the focused context first, then Global.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
    }

    fn bind_char(&mut self, context: Context, c: char, action: Action) {
        self.bind(context, KeySpec::plain(KeyCode::Char(c)), action);
    }

    fn register_defaults(&mut self) {
        use Action::*;

        // === Global ===
        self.bind(Context::Global, KeySpec::plain(KeyCode::F(1)), Quit);
        self.bind_char(Context::Global, 'q', Quit);
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
        self.bind(Context::Global, KeySpec::ctrl('c'), Quit);

        self.bind_char(Context::Global, 'j', NavDown);
        self.bind(Context::Global, KeySpec::plain(KeyCode::Down), NavDown);
        self.bind_char(Context::Global, 'k', NavUp);
        self.bind(Context::Global, KeySpec::plain(KeyCode::Up), NavUp);

        self.bind(Context::Global, KeySpec::plain(KeyCode::Tab), ToggleFocus);
        self.bind(Context::Global, KeySpec::plain(KeyCode::Enter), Select);

        self.bind_char(Context::Global, '=', ToggleSort);
        self.bind_char(Context::Global, 'R', Refresh);
        self.bind_char(Context::Global, 'a', AddSubscription);
        self.bind_char(Context::Global, 'A', MarkCategoryRead);

        // === Posts pane ===
        self.bind_char(Context::Posts, 'u', MarkUnread);
        self.bind_char(Context::Posts, 'r', MarkRead);
        self.bind_char(Context::Posts, 's', MarkSaved);
        self.bind_char(Context::Posts, 'S', MarkUnsaved);
        self.bind_char(Context::Posts, 'o', OpenPlainText);
        self.bind_char(Context::Posts, 'O', OpenInBrowser);
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted letters arrive with SHIFT set on some terminals.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
