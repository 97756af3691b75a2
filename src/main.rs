mod config;
mod sinks;

use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use logdeck_logs::{Console, LogProducer, ProducerManager, ReaderProducer, ViewRow};
use logdeck_tui::{
    Action, AppState, ConsoleScreen, Event, EventHandler, KeyBindings, KeyContext, Pane, Tui,
};

use config::Config;
use sinks::{CommandNavigator, NoticeFocus};

/// Logdeck - a terminal console for structured-prefix application logs
#[derive(Parser, Debug)]
#[command(name = "logdeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log files to read; `-` reads stdin (the default when stdin is piped)
    #[arg(value_name = "PATH")]
    paths: Vec<String>,

    /// Config file (defaults to ./logdeck.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Channel shown in the toolbar (repeatable, replaces configured channels)
    #[arg(long = "channel", value_name = "NAME")]
    channels: Vec<String>,

    /// Start with identical logs collapsed
    #[arg(long)]
    collapse: bool,

    /// Keep reading files as they grow
    #[arg(short, long)]
    follow: bool,

    /// Print the filtered view to stdout instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Command opening a source location, e.g. "code --goto {path}:{line}"
    #[arg(long, value_name = "TEMPLATE")]
    open_command: Option<String>,

    /// Directory relative stack trace paths are resolved against
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// View refresh interval in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,
}

impl Args {
    /// Layer CLI flags over the config file
    fn apply(&self, mut config: Config) -> Config {
        if !self.channels.is_empty() {
            config.channels = Some(self.channels.clone());
        }
        config.collapse |= self.collapse;
        config.follow |= self.follow;
        if self.open_command.is_some() {
            config.open_command = self.open_command.clone();
        }
        if self.project_root.is_some() {
            config.project_root = self.project_root.clone();
        }
        if self.tick_ms.is_some() {
            config.tick_ms = self.tick_ms;
        }
        config
    }

    fn inputs(&self) -> Result<Vec<String>> {
        if !self.paths.is_empty() {
            return Ok(self.paths.clone());
        }
        if std::io::stdin().is_terminal() {
            anyhow::bail!("no input given: pass log files or pipe logs into stdin");
        }
        Ok(vec!["-".to_string()])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_ref())?;

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = args.apply(Config::load(args.config.as_deref())?);
    let inputs = args.inputs()?;

    if args.print {
        return print_view(&config, &inputs).await;
    }
    run_app(&config, &inputs).await
}

fn producers(inputs: &[String], follow: bool) -> Vec<Box<dyn LogProducer>> {
    inputs
        .iter()
        .map(|arg| Box::new(ReaderProducer::from_arg(arg, follow)) as Box<dyn LogProducer>)
        .collect()
}

/// Read every input to the end and print the filtered view
async fn print_view(config: &Config, inputs: &[String]) -> Result<()> {
    let mut console = Console::new();
    let mut manager = ProducerManager::new();
    manager.start(producers(inputs, false), &console.ingestor());
    manager.join().await;

    // Channels seen in the input stay visible unless configured otherwise
    let mut spec = config.filter_spec();
    if config.channels.is_none() {
        spec.channel_mask.extend(console.store().channels());
    }

    let mut out = std::io::stdout().lock();
    for row in console.refresh(&spec) {
        writeln!(out, "{}", format_row(row))?;
    }
    out.flush()?;

    let dropped = console.dropped_count();
    if dropped > 0 {
        tracing::warn!(dropped, "malformed lines were dropped");
    }
    Ok(())
}

fn format_row(row: &ViewRow) -> String {
    let record = &row.record;
    if row.repeat_count > 1 {
        format!(
            "{} {} x{}",
            record.severity.as_str(),
            record.display_line(),
            row.repeat_count
        )
    } else {
        format!("{} {}", record.severity.as_str(), record.display_line())
    }
}

async fn run_app(config: &Config, inputs: &[String]) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Engine and sinks
    let console = Console::new()
        .with_navigation(Box::new(CommandNavigator::new(
            config.open_command.clone(),
            config.project_root.clone(),
            action_tx.clone(),
        )))
        .with_focus(Box::new(NoticeFocus::new(action_tx.clone())));

    let mut manager = ProducerManager::new();
    manager.start(producers(inputs, config.follow), &console.ingestor());

    let mut state = AppState::new(console, config.filter_spec(), config.channels());
    state.refresh_view();

    // Initialize TUI
    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(config.tick_ms()));
    let keybindings = KeyBindings::new();

    // Initial render
    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.search_active {
                            keybindings.get_search_input_action(&key)
                        } else {
                            let context = match state.ui_state.focus {
                                Pane::Rows => KeyContext::Rows,
                                Pane::StackTrace => KeyContext::StackTrace,
                            };
                            keybindings.get_action(context, &key)
                        };
                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Click(column, row) => {
                        let _ = action_tx.send(Action::Click(column, row));
                    }
                    Event::Scroll(delta) => {
                        let action = if delta < 0 { Action::SelectUp } else { Action::SelectDown };
                        let _ = action_tx.send(action);
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_notice(e);
                        state.render_dirty = true;
                    }
                }
            }

            // Handle user actions and sink notices
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, action);
            }
        }

        if state.should_quit {
            break;
        }

        if state.render_dirty {
            render(&mut tui, &mut state)?;
        }
    }

    // Cleanup
    manager.stop();
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(state: &mut AppState, action: Action) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::GoBack => {
            if state.ui_state.notice.is_some() {
                state.dismiss_notice();
            } else if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
            } else if state.ui_state.focus == Pane::StackTrace {
                state.toggle_focus();
            } else if !state.spec.search_term.is_empty() {
                state.clear_search();
            } else {
                state.console.clear_selection();
                state.ui_state.auto_scroll = true;
            }
        }
        Action::ToggleHelp => state.ui_state.help_visible = !state.ui_state.help_visible,
        Action::ToggleFocus => state.toggle_focus(),

        Action::SelectUp => state.select_offset(-1),
        Action::SelectDown => state.select_offset(1),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),
        Action::SelectFirst => state.select_first(),
        Action::SelectLast => {
            state.select_last();
            state.ui_state.auto_scroll = true;
        }
        Action::ToggleFollow => state.ui_state.auto_scroll = !state.ui_state.auto_scroll,
        Action::JumpToOrigin => state.jump_to_origin(),
        Action::Click(column, row) => state.click(column, row),

        Action::FrameUp => state.frame_up(),
        Action::FrameDown => state.frame_down(),
        Action::OpenFrame => state.open_frame(),

        Action::ToggleCollapse => state.toggle_collapse(),
        Action::ToggleSeverity(severity) => state.toggle_severity(severity),
        Action::ChannelPrev => state.channel_prev(),
        Action::ChannelNext => state.channel_next(),
        Action::ToggleChannel => state.toggle_channel(),
        Action::EnableAllChannels => state.enable_all_channels(),

        Action::OpenSearch => state.start_search(),
        Action::CloseSearch => state.cancel_search(),
        Action::SearchInput(c) => state.search_input_char(c),
        Action::SearchBackspace => state.search_input_backspace(),
        Action::SearchClear => state.ui_state.search_input.clear(),
        Action::ApplySearch => state.apply_search(),
        Action::ClearSearch => state.clear_search(),

        Action::ClearLogs => state.clear_logs(),

        Action::ShowNotice(msg) => state.show_notice(msg),
        Action::DismissNotice => state.dismiss_notice(),

        // Only a rebuilt view needs a redraw
        Action::Tick => {
            state.refresh_view();
            return;
        }
        Action::Render => {}
    }

    // Filter and selection changes apply immediately
    state.refresh_view();
    state.render_dirty = true;
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.draw(|frame| ConsoleScreen::render(frame, state))?;
    state.render_dirty = false;

    Ok(())
}
