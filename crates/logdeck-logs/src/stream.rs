use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use logdeck_types::{ObjectRef, Severity};

use crate::Ingestor;

/// How long a following reader waits at end of file before polling again
const FOLLOW_POLL: Duration = Duration::from_millis(250);

/// A source of log lines.
///
/// Producers are registered explicitly with a [`ProducerManager`].
pub trait LogProducer: Send {
    /// Name used in diagnostics
    fn name(&self) -> String;

    /// Spawn the producer, feeding `ingestor` until done or cancelled
    fn spawn(self: Box<Self>, ingestor: Ingestor, cancel: CancellationToken) -> JoinHandle<()>;
}

/// Manages the lifetime of registered producers
pub struct ProducerManager {
    /// Cancellation token for stopping producers
    cancel: CancellationToken,

    /// Active producer task handles
    tasks: Vec<JoinHandle<()>>,
}

impl ProducerManager {
    /// Create a new producer manager
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Start every given producer
    pub fn start<I>(&mut self, producers: I, ingestor: &Ingestor)
    where
        I: IntoIterator<Item = Box<dyn LogProducer>>,
    {
        for producer in producers {
            tracing::info!(producer = %producer.name(), "starting log producer");
            let task = producer.spawn(ingestor.clone(), self.cancel.clone());
            self.tasks.push(task);
        }
    }

    /// Stop all producers
    pub fn stop(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        // Create a fresh cancellation token for future producers
        self.cancel = CancellationToken::new();
    }

    /// Wait for every producer to finish on its own
    pub async fn join(&mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }

    /// Check if any producers are still running
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    /// Get the number of active producers
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Default for ProducerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProducerManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One line as carried by a JSON-lines input
#[derive(Debug, Deserialize)]
struct WireLine {
    raw: String,
    #[serde(default)]
    stack_trace: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    context: Option<u64>,
}

/// A decoded input line, ready for ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub raw: String,
    pub stack_trace: String,
    pub severity: Severity,
    pub context: Option<ObjectRef>,
}

impl InputLine {
    /// Decode an input line: a JSON object, or a bare structured line at Info
    pub fn decode(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim_start().starts_with('{')
            && let Ok(wire) = serde_json::from_str::<WireLine>(trimmed)
        {
            return Self {
                raw: wire.raw,
                stack_trace: wire.stack_trace,
                severity: wire.severity.as_deref().map(Severity::parse).unwrap_or_default(),
                context: wire.context.map(ObjectRef),
            };
        }

        Self {
            raw: trimmed.to_string(),
            stack_trace: String::new(),
            severity: Severity::Info,
            context: None,
        }
    }

    fn ingest(self, ingestor: &Ingestor) {
        ingestor.on_log_line(&self.raw, &self.stack_trace, self.severity, self.context);
    }
}

/// Where a reader producer takes its lines from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderSource {
    Stdin,
    File(PathBuf),
}

/// Producer reading lines from a file or stdin
pub struct ReaderProducer {
    source: ReaderSource,

    /// Keep polling a file after reaching its end
    follow: bool,
}

impl ReaderProducer {
    pub fn new(source: ReaderSource, follow: bool) -> Self {
        Self { source, follow }
    }

    /// `-` means stdin, anything else is a file path
    pub fn from_arg(arg: &str, follow: bool) -> Self {
        let source = if arg == "-" {
            ReaderSource::Stdin
        } else {
            ReaderSource::File(PathBuf::from(arg))
        };
        Self::new(source, follow)
    }

    async fn run(self, ingestor: Ingestor, cancel: CancellationToken) {
        let name = self.name();
        match self.source {
            ReaderSource::Stdin => {
                let reader = BufReader::new(tokio::io::stdin());
                pump(reader, &ingestor, &cancel, false).await;
            }
            ReaderSource::File(path) => match tokio::fs::File::open(&path).await {
                Ok(file) => {
                    pump(BufReader::new(file), &ingestor, &cancel, self.follow).await;
                }
                Err(e) => {
                    tracing::warn!(producer = %name, error = %e, "failed to open log file");
                }
            },
        }
        tracing::info!(producer = %name, "log producer finished");
    }
}

impl LogProducer for ReaderProducer {
    fn name(&self) -> String {
        match &self.source {
            ReaderSource::Stdin => "stdin".to_string(),
            ReaderSource::File(path) => path.display().to_string(),
        }
    }

    fn spawn(self: Box<Self>, ingestor: Ingestor, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn((*self).run(ingestor, cancel))
    }
}

/// Feed every line of `reader` to the ingestor
pub async fn pump<R>(mut reader: R, ingestor: &Ingestor, cancel: &CancellationToken, follow: bool)
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = String::new();

    loop {
        buf.clear();
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = reader.read_line(&mut buf) => result,
        };

        match result {
            Ok(0) if follow => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(FOLLOW_POLL) => {}
                }
            }
            Ok(0) => break,
            Ok(_) => {
                if !buf.trim().is_empty() {
                    InputLine::decode(&buf).ingest(ingestor);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "error reading log input");
                break;
            }
        }
    }
}
