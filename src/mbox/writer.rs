//! Rendered messages and the mbox stream writer.

use std::io::Write;

use crate::github::HubmailError;

/// Serialised bytes of one mbox message.
///
/// A message begins with its `From ` separator line. Assembled messages end
/// with a newline; patch messages keep their source bytes and may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage(Vec<u8>);

impl RenderedMessage {
    /// Wraps serialised bytes, terminating them with a newline if needed.
    #[must_use]
    pub fn new(mut bytes: Vec<u8>) -> Self {
        if bytes.last() != Some(&b'\n') {
            bytes.push(b'\n');
        }
        Self(bytes)
    }

    /// Wraps serialised bytes exactly as given.
    #[must_use]
    pub const fn verbatim(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Message bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Message as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Consumes the message, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<String> for RenderedMessage {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

/// Writes messages as one mbox stream, separated by a single blank line.
///
/// A message that does not end with a newline is terminated in the stream
/// before the next separator; its own bytes are written unchanged.
pub struct MboxWriter<W: Write> {
    inner: W,
    written: usize,
    line_open: bool,
}

impl<W: Write> MboxWriter<W> {
    /// Creates a writer over `inner`.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            written: 0,
            line_open: false,
        }
    }

    /// Number of messages written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Appends one message to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Io`] when the underlying writer fails.
    pub fn write_message(&mut self, message: &RenderedMessage) -> Result<(), HubmailError> {
        if self.written > 0 {
            let separator: &[u8] = if self.line_open { b"\n\n" } else { b"\n" };
            self.inner.write_all(separator).map_err(|e| io_error(&e))?;
        }
        let bytes = message.as_bytes();
        self.inner.write_all(bytes).map_err(|e| io_error(&e))?;
        self.line_open = bytes.last().is_some_and(|byte| *byte != b'\n');
        self.written += 1;
        Ok(())
    }

    /// Appends several messages in order.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Io`] when the underlying writer fails.
    pub fn write_all(&mut self, messages: &[RenderedMessage]) -> Result<(), HubmailError> {
        messages
            .iter()
            .try_for_each(|message| self.write_message(message))
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Io`] when flushing fails.
    pub fn finish(mut self) -> Result<W, HubmailError> {
        self.inner.flush().map_err(|e| io_error(&e))?;
        Ok(self.inner)
    }
}

fn io_error(error: &std::io::Error) -> HubmailError {
    HubmailError::Io {
        message: error.to_string(),
    }
}
