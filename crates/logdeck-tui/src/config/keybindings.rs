use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use logdeck_types::Severity;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Rows,
    StackTrace,
    SearchInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::ToggleFocus);
        // Filters work from either pane
        global.insert(KeyBinding::new(KeyCode::Char('c')), Action::ToggleCollapse);
        global.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        global.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearSearch);
        global.insert(KeyBinding::new(KeyCode::Char('[')), Action::ChannelPrev);
        global.insert(KeyBinding::new(KeyCode::Char(']')), Action::ChannelNext);
        global.insert(KeyBinding::new(KeyCode::Char(' ')), Action::ToggleChannel);
        global.insert(KeyBinding::new(KeyCode::Char('a')), Action::EnableAllChannels);
        global.insert(KeyBinding::shift(KeyCode::Char('X')), Action::ClearLogs);
        for (key, severity) in ['1', '2', '3', '4', '5'].into_iter().zip(Severity::ALL) {
            global.insert(
                KeyBinding::new(KeyCode::Char(key)),
                Action::ToggleSeverity(severity),
            );
        }
        bindings.insert(KeyContext::Global, global);

        // Row list bindings - less-like navigation
        let mut rows = HashMap::new();
        rows.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectDown);
        rows.insert(KeyBinding::new(KeyCode::Down), Action::SelectDown);
        rows.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectUp);
        rows.insert(KeyBinding::new(KeyCode::Up), Action::SelectUp);
        rows.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        rows.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        rows.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        rows.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        rows.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        rows.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        rows.insert(KeyBinding::new(KeyCode::Char('g')), Action::SelectFirst);
        rows.insert(KeyBinding::shift(KeyCode::Char('G')), Action::SelectLast);
        rows.insert(KeyBinding::new(KeyCode::Home), Action::SelectFirst);
        rows.insert(KeyBinding::new(KeyCode::End), Action::SelectLast);
        rows.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFollow);
        rows.insert(KeyBinding::new(KeyCode::Enter), Action::JumpToOrigin);
        bindings.insert(KeyContext::Rows, rows);

        // Stack trace pane bindings
        let mut trace = HashMap::new();
        trace.insert(KeyBinding::new(KeyCode::Char('j')), Action::FrameDown);
        trace.insert(KeyBinding::new(KeyCode::Down), Action::FrameDown);
        trace.insert(KeyBinding::new(KeyCode::Char('k')), Action::FrameUp);
        trace.insert(KeyBinding::new(KeyCode::Up), Action::FrameUp);
        trace.insert(KeyBinding::new(KeyCode::Enter), Action::OpenFrame);
        trace.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleFocus);
        bindings.insert(KeyContext::StackTrace, trace);

        // Search input bindings (when search bar is active)
        let mut search_input = HashMap::new();
        search_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplySearch);
        search_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        search_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        bindings.insert(KeyContext::SearchInput, search_input);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in search input mode
    /// Returns Some(Action) for special keys, None for unbound modified keys
    pub fn get_search_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&KeyContext::SearchInput)
            .and_then(|search_bindings| search_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // For regular characters, return SearchInput action
        if let KeyCode::Char(c) = key.code
            && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
        {
            return Some(Action::SearchInput(c));
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
