//! Support modules for the mbox export BDD tests.

pub(crate) mod fixtures;
#[path = "../support/runtime.rs"]
pub(crate) mod runtime;
pub(crate) mod state;

pub(crate) use fixtures::{comment_node, patch_series, split_mailbox, thread_node};
pub(crate) use state::{ExportState, ensure_runtime_and_server};
