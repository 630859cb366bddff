//! RFC 4155 mbox serialisation.
//!
//! [`MessageAssembler`] turns one post or comment into a MIME message,
//! [`PatchSplitter`] re-threads a pull request's `git format-patch` mailbox,
//! and [`MboxWriter`] concatenates the results into a single stream.

pub mod assembler;
pub mod attachments;
pub mod headers;
pub mod patch;
pub mod wrap;
pub mod writer;

pub use assembler::{EmailDraft, MessageAssembler};
pub use attachments::{Attachment, extract_image_urls};
pub use patch::PatchSplitter;
pub use writer::{MboxWriter, RenderedMessage};
