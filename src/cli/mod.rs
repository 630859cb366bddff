//! CLI operation handlers.
//!
//! - [`export`]: Resolve the target and render it to the mailbox
//! - [`output`]: Stdout or file destinations for the mbox stream

pub mod export;
pub mod output;
