//! Output destinations for the mbox stream.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use hubmail::HubmailError;

/// Where the mailbox is written.
pub enum Destination {
    /// Standard output.
    Stdout(BufWriter<io::Stdout>),
    /// A newly created file.
    File(BufWriter<File>),
}

impl Destination {
    /// Opens `path`, truncating it, or stdout when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Io`] when the file cannot be created.
    pub fn open(path: Option<&Path>) -> Result<Self, HubmailError> {
        let Some(target) = path else {
            return Ok(Self::Stdout(BufWriter::new(io::stdout())));
        };
        let file = File::create(target).map_err(|e| HubmailError::Io {
            message: format!("failed to create output file '{}': {e}", target.display()),
        })?;
        Ok(Self::File(BufWriter::new(file)))
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Io`] when flushing fails.
    pub fn close(mut self) -> Result<(), HubmailError> {
        self.flush().map_err(|e| HubmailError::Io {
            message: format!("failed to flush output: {e}"),
        })
    }
}

impl Write for Destination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}
