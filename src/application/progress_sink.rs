//! Destination for human-readable progress lines

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Receives one rendered line per settled work item.
pub trait ProgressSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Line-oriented sink over any writer
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ProgressSink for WriterSink<W> {
    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            tracing::warn!("Failed to write progress line: {}", e);
        }
    }
}

/// Collects lines in memory
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ProgressSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sink_terminates_each_line() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("[Comment] 1/1 Total: 1/1: ok a");
        sink.write_line("second");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "[Comment] 1/1 Total: 1/1: ok a\nsecond\n");
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.write_line("a");
        sink.write_line("b");
        assert_eq!(sink.lines(), vec!["a".to_string(), "b".to_string()]);
    }
}
