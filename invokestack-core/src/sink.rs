//! Output sinks for function output and runtime diagnostics

use std::io::Write;
use tracing::warn;

/// Write-only channel receiving function output or diagnostics.
///
/// Writes are fire-and-forget. Implementations forward data immediately and
/// must not hold it back for later.
pub trait OutputSink {
    fn write_str(&mut self, text: &str);

    fn write_bytes(&mut self, bytes: &[u8]);
}

/// Sink over any [`Write`] handle, flushing after every write.
pub struct StreamWriter<W: Write> {
    stream: W,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    fn forward(&mut self, bytes: &[u8]) {
        if let Err(e) = self.stream.write_all(bytes).and_then(|()| self.stream.flush()) {
            warn!(error = %e, "Failed to write to output stream");
        }
    }
}

impl<W: Write> OutputSink for StreamWriter<W> {
    fn write_str(&mut self, text: &str) {
        self.forward(text.as_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.forward(bytes);
    }
}

impl OutputSink for Vec<u8> {
    fn write_str(&mut self, text: &str) {
        self.extend_from_slice(text.as_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}
