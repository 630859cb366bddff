//! Export operation: resolve the target, fetch, render and write.

use hubmail::github::gateway::DEFAULT_API_URL;
use hubmail::{ExportTarget, GithubClient, HubmailConfig, HubmailError, MboxWriter, ThreadRenderer};
use tracing::info;

use super::output::Destination;

/// Exports the configured issue, pull request or collection.
///
/// Everything that can be checked locally (target, counts, page size and
/// token) is validated before the first request.
///
/// # Errors
///
/// Returns an error if:
/// - The target or any count is missing or invalid
/// - The token is missing
/// - A GitHub request fails or a patch is malformed
/// - Writing to the output fails
pub async fn run(config: &HubmailConfig) -> Result<(), HubmailError> {
    let target = config.target()?;
    let options = config.render_options()?;
    let token = config.require_token()?;

    let api_url = config.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let client = GithubClient::new(token, api_url, config.timeout())?;
    let renderer = ThreadRenderer::new(&client, &client, options);

    let mut writer = MboxWriter::new(Destination::open(config.output.as_deref())?);
    match target {
        ExportTarget::Thread(locator) => {
            let messages = renderer.render_thread(&locator).await?;
            writer.write_all(&messages)?;
        }
        ExportTarget::Collection { repository, kind } => {
            renderer
                .render_collection(&repository, kind, &mut writer)
                .await?;
        }
    }

    let written = writer.written();
    writer.finish()?.close()?;
    info!(messages = written, "export complete");
    Ok(())
}
