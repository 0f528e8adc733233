//! Named log channels (§6): `commit`, `rollback`, `save`, and `ugh`, each
//! forwarded to the `log` facade at an appropriate level and additionally
//! buffered in memory so a driving CLI or test can inspect what happened
//! after the fact without scraping stderr.

/// One recorded log line: the channel it was logged on, and the rendered
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Channel name (`"commit"`, `"rollback"`, `"save"`, or `"ugh"`).
    pub channel: &'static str,
    /// Rendered message text.
    pub message: String,
}

/// An in-memory sink for the pipeline's four named channels, forwarding
/// every record to `log::info!`/`log::warn!` as it is recorded.
#[derive(Debug, Default)]
pub struct LogChannels {
    records: Vec<LogRecord>,
}

impl LogChannels {
    /// Create an empty set of channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message on the `commit` channel.
    pub fn commit(&mut self, message: impl Into<String>) {
        self.record("commit", message, false);
    }

    /// Record a message on the `rollback` channel.
    pub fn rollback(&mut self, message: impl Into<String>) {
        self.record("rollback", message, true);
    }

    /// Record a message on the `save` channel.
    pub fn save(&mut self, message: impl Into<String>) {
        self.record("save", message, false);
    }

    /// Record a message on the `ugh` channel (model-level diagnostics).
    pub fn ugh(&mut self, message: impl Into<String>) {
        self.record("ugh", message, false);
    }

    fn record(&mut self, channel: &'static str, message: impl Into<String>, is_warning: bool) {
        let message = message.into();
        if is_warning {
            log::warn!(target: "digdoc::pipeline", "[{channel}] {message}");
        } else {
            log::info!(target: "digdoc::pipeline", "[{channel}] {message}");
        }
        self.records.push(LogRecord { channel, message });
    }

    /// All records logged so far, in order.
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Records logged on a specific channel, in order.
    pub fn channel(&self, name: &str) -> Vec<&LogRecord> {
        self.records.iter().filter(|r| r.channel == name).collect()
    }
}
