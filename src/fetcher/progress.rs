use tracing::{debug, info};

/// Severity of a progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Detail only interesting when diagnosing a fetch.
    Verbose,
    /// Milestones worth showing to the user.
    Log,
}

/// Receives advisory progress messages from a fetch.
pub trait Progress {
    fn emit(&self, level: Level, message: &str);
}

/// Forwards progress to `tracing`: verbose as `debug`, log as `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Verbose => debug!(target: "plugin_fetcher::progress", "{message}"),
            Level::Log => info!(target: "plugin_fetcher::progress", "{message}"),
        }
    }
}

/// Keeps every message in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    events: std::sync::Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages received so far.
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Progress for RecordingProgress {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}
