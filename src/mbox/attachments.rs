//! Image discovery and best-effort attachment download.
//!
//! Image references are found by parsing the plain-text body as Markdown.
//! Every download or type inference failure is logged and that image is
//! skipped; it never fails the message.

use comrak::nodes::NodeValue;
use comrak::{Arena, Options, parse_document};
use tracing::warn;
use url::Url;

use crate::github::ResourceFetcher;

/// A downloaded image ready to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name taken from the last URL path segment.
    pub filename: String,
    /// MIME type guessed from the URL path, e.g. `image/png`.
    pub content_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Returns the URL of every Markdown image in `text`, in document order.
///
/// # Example
///
/// ```
/// use hubmail::mbox::attachments::extract_image_urls;
///
/// let urls = extract_image_urls("see ![shot](https://example.com/a.png) and [a link](x)");
/// assert_eq!(urls, vec!["https://example.com/a.png".to_owned()]);
/// ```
#[must_use]
pub fn extract_image_urls(text: &str) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, text, &Options::default());

    root.descendants()
        .filter_map(|node| match node.data.borrow().value {
            NodeValue::Image(ref link) if !link.url.is_empty() => Some(link.url.clone()),
            _ => None,
        })
        .collect()
}

/// Infers the file name and MIME type for an image URL.
fn describe(url: &str) -> Result<(String, String), String> {
    let parsed = Url::parse(url).map_err(|error| format!("invalid URL: {error}"))?;
    let filename = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| "URL has no file name".to_owned())?
        .to_owned();
    let content_type = mime_guess::from_path(parsed.path())
        .first()
        .ok_or_else(|| format!("cannot infer a MIME type for {filename}"))?
        .essence_str()
        .to_owned();
    Ok((filename, content_type))
}

/// Downloads every image referenced by `body`, skipping failures.
pub async fn fetch_images<F>(fetcher: &F, body: &str) -> Vec<Attachment>
where
    F: ResourceFetcher + ?Sized,
{
    let mut attachments = Vec::new();
    for url in extract_image_urls(body) {
        let (filename, content_type) = match describe(&url) {
            Ok(described) => described,
            Err(reason) => {
                warn!(%url, %reason, "skipping image attachment");
                continue;
            }
        };
        match fetcher.fetch(&url).await {
            Ok(data) => attachments.push(Attachment {
                filename,
                content_type,
                data,
            }),
            Err(error) => warn!(%url, %error, "skipping image attachment"),
        }
    }
    attachments
}
