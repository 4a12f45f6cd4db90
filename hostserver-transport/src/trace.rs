//! Datastream hex tracing
//!
//! Tracing is a side channel: the tracer only sees copies of bytes that were
//! already read or queued for writing. Each logical message starts with a
//! timestamped header line, bytes follow as space separated uppercase hex
//! pairs, and [`Tracer::end`] closes the message with a blank line.

use hostserver_codec::hex_dump_line;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Log target for datastream dumps
pub const TRACE_TARGET: &str = "hostserver::datastream";

/// Default number of bytes rendered per trace line
pub const DEFAULT_BYTES_PER_LINE: usize = 16;

/// Datastream trace settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    pub enabled: bool,
    pub bytes_per_line: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bytes_per_line: DEFAULT_BYTES_PER_LINE,
        }
    }
}

impl TraceConfig {
    /// Tracing switched on with the default line width
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

/// Destination for rendered trace lines
pub trait TraceSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Sends trace lines to the `log` facade at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn line(&self, line: &str) {
        log::trace!(target: TRACE_TARGET, "{}", line);
    }
}

/// Collects trace lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryTraceSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TraceSink for MemoryTraceSink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Per-direction trace state for one reader or writer
pub struct Tracer {
    config: TraceConfig,
    sink: Arc<dyn TraceSink>,
    label: &'static str,
    pending: Vec<u8>,
    in_message: bool,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("config", &self.config)
            .field("label", &self.label)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Tracer {
    pub fn new(config: TraceConfig, sink: Arc<dyn TraceSink>, label: &'static str) -> Self {
        Self {
            config,
            sink,
            label,
            pending: Vec::new(),
            in_message: false,
        }
    }

    /// A tracer logging through [`LogTraceSink`]
    pub fn to_log(config: TraceConfig, label: &'static str) -> Self {
        Self::new(config, Arc::new(LogTraceSink), label)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Switch tracing on or off; switching off finishes the current message
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.end();
        }
        self.config.enabled = enabled;
    }

    /// Record bytes that crossed the wire
    pub fn record(&mut self, bytes: &[u8]) {
        if !self.config.enabled || bytes.is_empty() {
            return;
        }
        if !self.in_message {
            self.sink.line(&format!("{} at {}", self.label, timestamp()));
            self.in_message = true;
        }
        let width = self.config.bytes_per_line.max(1);
        for &b in bytes {
            self.pending.push(b);
            if self.pending.len() == width {
                self.finish_line();
            }
        }
    }

    /// Emit any partially filled line
    pub fn finish_line(&mut self) {
        if !self.pending.is_empty() {
            self.sink.line(&hex_dump_line(&self.pending));
            self.pending.clear();
        }
    }

    /// Mark the end of a logical datastream message
    pub fn end(&mut self) {
        if !self.config.enabled {
            return;
        }
        self.finish_line();
        if self.in_message {
            self.sink.line("");
            self.in_message = false;
        }
    }
}

/// Seconds and milliseconds since the Unix epoch
fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_tracer(config: TraceConfig) -> (Tracer, MemoryTraceSink) {
        let sink = MemoryTraceSink::new();
        (Tracer::new(config, Arc::new(sink.clone()), "Sent"), sink)
    }

    #[test]
    fn test_disabled_records_nothing() {
        let (mut tracer, sink) = memory_tracer(TraceConfig::default());
        tracer.record(&[1, 2, 3]);
        tracer.end();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_wraps_at_sixteen_bytes() {
        let (mut tracer, sink) = memory_tracer(TraceConfig::enabled());
        let bytes: Vec<u8> = (0u8..20).collect();
        tracer.record(&bytes[..7]);
        tracer.record(&bytes[7..]);
        tracer.end();

        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Sent at "));
        assert_eq!(
            lines[1],
            "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[2], "10 11 12 13");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_end_between_messages() {
        let (mut tracer, sink) = memory_tracer(TraceConfig {
            enabled: true,
            bytes_per_line: 2,
        });
        tracer.record(&[0xAB, 0xCD, 0xEF]);
        tracer.end();
        tracer.end();
        tracer.record(&[0x01]);
        tracer.end();

        let lines = sink.lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "AB CD");
        assert_eq!(lines[2], "EF");
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("Sent at "));
        assert_eq!(lines[5], "01");
        assert_eq!(lines[6], "");
    }
}
