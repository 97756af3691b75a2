//! Terminal user interface for logdeck
//!
//! State management, keybindings, event handling and the console screen
//! on top of the `logdeck-logs` engine.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Pane, UiState, ViewCache};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, StatusBar, console_hints, trace_hints};
pub use ui::screens::ConsoleScreen;
pub use ui::{Layout, Theme};
