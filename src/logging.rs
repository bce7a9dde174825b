use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Fans formatted log lines out to a broadcast channel (read by the dashboard
/// footer) and, unless suppressed, to stderr.
#[derive(Clone)]
pub struct FeedMakeWriter {
    pub sender: broadcast::Sender<String>,
    pub suppress_stderr: bool,
}

impl<'a> MakeWriter<'a> for FeedMakeWriter {
    type Writer = FeedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FeedWriter {
            sender: self.sender.clone(),
            suppress_stderr: self.suppress_stderr,
        }
    }
}

pub struct FeedWriter {
    sender: broadcast::Sender<String>,
    suppress_stderr: bool,
}

impl std::io::Write for FeedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf).trim_end().to_string();
        if !msg.is_empty() {
            let _ = self.sender.send(msg); // Ignored if no receivers
        }
        if !self.suppress_stderr {
            std::io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        if !self.suppress_stderr {
            std::io::stderr().flush()?;
        }
        Ok(())
    }
}

/// Installs the global subscriber. Returns the sender so callers can
/// subscribe to the line feed.
pub fn init(level: Level, suppress_stderr: bool) -> broadcast::Sender<String> {
    let (sender, _) = broadcast::channel(64);
    let make_writer = FeedMakeWriter {
        sender: sender.clone(),
        suppress_stderr,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(!suppress_stderr)
        .with_target(false)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Already set in tests
    sender
}
