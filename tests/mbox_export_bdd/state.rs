//! Scenario state for the mbox export BDD tests.

use hubmail::HubmailError;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use wiremock::MockServer;

use super::runtime::SharedRuntime;

/// Scenario state for mbox export tests.
#[derive(ScenarioState, Default)]
pub(crate) struct ExportState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) token: Slot<String>,
    pub(crate) output: Slot<String>,
    pub(crate) error: Slot<HubmailError>,
}

/// Ensures the runtime and server are initialised in `ExportState`.
pub(crate) fn ensure_runtime_and_server(
    export_state: &ExportState,
) -> Result<SharedRuntime, HubmailError> {
    super::runtime::ensure_runtime_and_server(&export_state.runtime, &export_state.server).map_err(
        |error| HubmailError::Io {
            message: format!("failed to create Tokio runtime: {error}"),
        },
    )
}
