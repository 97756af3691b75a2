use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseButton, MouseEventKind,
};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Terminal tick (for periodic view refresh)
    Tick,
    /// Key press event
    Key(KeyEvent),
    /// Left click at (column, row)
    Click(u16, u16),
    /// Wheel scroll: negative is up
    Scroll(i8),
    /// Terminal resize
    Resize(u16, u16),
    /// Error occurred
    Error(String),
}

impl Event {
    /// Translate a crossterm event; None for events the console ignores
    fn from_crossterm(evt: CrosstermEvent) -> Option<Self> {
        match evt {
            // Filter out release events (important for Windows)
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    Some(Self::Click(mouse.column, mouse.row))
                }
                MouseEventKind::ScrollUp => Some(Self::Scroll(-1)),
                MouseEventKind::ScrollDown => Some(Self::Scroll(1)),
                _ => None,
            },
            CrosstermEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Event handler managing terminal input
pub struct EventHandler {
    /// Event receiver
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut tick_interval = tokio::time::interval(tick_rate);

                loop {
                    let tick = tick_interval.tick();
                    let crossterm_event = reader.next().fuse();

                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = tick => {
                            let _ = sender.send(Event::Tick);
                        }

                        maybe_event = crossterm_event => {
                            match maybe_event {
                                Some(Ok(evt)) => {
                                    if let Some(event) = Event::from_crossterm(evt) {
                                        let _ = sender.send(event);
                                    }
                                }
                                Some(Err(e)) => {
                                    let _ = sender.send(Event::Error(e.to_string()));
                                }
                                None => break,
                            }
                        }
                    }
                }
            });
        }

        Self { receiver, cancel }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Shutdown the event handler
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
