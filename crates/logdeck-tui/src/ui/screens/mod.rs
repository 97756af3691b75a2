mod console;

pub use console::ConsoleScreen;
