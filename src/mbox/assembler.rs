//! Assembly of one MIME message per thread post or comment.
//!
//! The plain-text body is normalised to `\n` line endings, optionally filled
//! to the wrap width, and `From`-escaped before anything else sees it. Image
//! attachments are then discovered in that final text. The message shape
//! follows from what is present:
//!
//! | HTML | images | shape                                          |
//! |------|--------|------------------------------------------------|
//! | no   | no     | `text/plain`                                   |
//! | yes  | no     | `multipart/alternative` (text, html)           |
//! | no   | yes    | `multipart/mixed` (text, images...)            |
//! | yes  | yes    | `multipart/mixed` (alternative, images...)     |

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::github::{Actor, ResourceFetcher};

use super::attachments::{Attachment, fetch_images};
use super::headers::{HeaderBlock, encode_text, format_date, format_mailbox, separator_line};
use super::writer::RenderedMessage;
use super::wrap::fill_text;

/// SMTP line length limit in octets, excluding the line terminator.
const MAX_LINE_OCTETS: usize = 998;

/// Line length of base64 bodies.
const BASE64_LINE: usize = 76;

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
static FROM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^From").expect("From escape pattern is valid"));

/// Everything needed to render one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft<'a> {
    /// Author shown in `From`.
    pub author: &'a Actor,
    /// Value of the `Date` header and the separator line.
    pub timestamp: DateTime<Utc>,
    /// Unencoded subject text.
    pub subject: &'a str,
    /// Markdown source of the body.
    pub body: &'a str,
    /// `Message-ID`; omitted when empty.
    pub message_id: &'a str,
    /// Parent message identifier.
    pub in_reply_to: Option<&'a str>,
    /// Earlier references, space separated.
    pub references: Option<&'a str>,
    /// Rendered HTML alternative.
    pub html: Option<&'a str>,
}

impl<'a> EmailDraft<'a> {
    /// Creates a draft without threading headers or HTML.
    #[must_use]
    pub const fn new(
        author: &'a Actor,
        timestamp: DateTime<Utc>,
        subject: &'a str,
        body: &'a str,
        message_id: &'a str,
    ) -> Self {
        Self {
            author,
            timestamp,
            subject,
            body,
            message_id,
            in_reply_to: None,
            references: None,
            html: None,
        }
    }

    /// Sets the parent message.
    #[must_use]
    pub const fn in_reply_to(mut self, parent: &'a str) -> Self {
        self.in_reply_to = Some(parent);
        self
    }

    /// Sets earlier references.
    #[must_use]
    pub const fn references(mut self, references: &'a str) -> Self {
        self.references = Some(references);
        self
    }

    /// Sets the HTML alternative.
    #[must_use]
    pub const fn html(mut self, html: Option<&'a str>) -> Self {
        self.html = html;
        self
    }

    fn references_header(&self) -> Option<String> {
        match (self.references, self.in_reply_to) {
            (Some(references), Some(parent)) => Some(format!("{references} {parent}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
            (None, None) => None,
        }
    }
}

/// Builds [`RenderedMessage`]s from drafts.
pub struct MessageAssembler<'f, F: ResourceFetcher + ?Sized> {
    fetcher: &'f F,
    wrap: Option<usize>,
}

impl<'f, F: ResourceFetcher + ?Sized> MessageAssembler<'f, F> {
    /// Creates an assembler; a wrap width of zero disables wrapping.
    #[must_use]
    pub fn new(fetcher: &'f F, wrap: Option<usize>) -> Self {
        Self {
            fetcher,
            wrap: wrap.filter(|width| *width > 0),
        }
    }

    /// Effective wrap width.
    #[must_use]
    pub const fn wrap(&self) -> Option<usize> {
        self.wrap
    }

    /// Normalises, fills and `From`-escapes a body.
    #[must_use]
    pub fn prepare_body(&self, body: &str) -> String {
        prepare_body(body, self.wrap)
    }

    /// Renders one message, downloading referenced images.
    ///
    /// Image failures are logged and skipped, so assembly cannot fail.
    pub async fn assemble(&self, draft: &EmailDraft<'_>) -> RenderedMessage {
        let body = self.prepare_body(draft.body);
        let attachments = fetch_images(self.fetcher, &body).await;
        serialise(draft, &body, &attachments, self.wrap)
    }
}

/// Normalises line endings, fills to `wrap` and escapes `From` lines.
#[must_use]
pub fn prepare_body(body: &str, wrap: Option<usize>) -> String {
    let normalised = body.replace("\r\n", "\n");
    let filled = match wrap {
        Some(width) if width > 0 => fill_text(&normalised, width),
        _ => normalised,
    };
    FROM_LINE.replace_all(&filled, ">From").into_owned()
}

/// Serialises a prepared body and its attachments into one message.
#[must_use]
pub fn serialise(
    draft: &EmailDraft<'_>,
    body: &str,
    attachments: &[Attachment],
    wrap: Option<usize>,
) -> RenderedMessage {
    let text = text_part("plain", body);
    let content = match draft.html {
        Some(html) => {
            let alternative = [text, text_part("html", html)];
            multipart("alternative", draft.message_id, &alternative, wrap)
        }
        None => text,
    };

    let content = if attachments.is_empty() {
        content
    } else {
        let mut parts = Vec::with_capacity(attachments.len() + 1);
        parts.push(content);
        parts.extend(attachments.iter().map(attachment_part));
        multipart("mixed", draft.message_id, &parts, wrap)
    };

    let mut headers = HeaderBlock::new();
    headers.push(
        "From",
        format_mailbox(draft.author.name(), draft.author.address()),
    );
    headers.push("Date", format_date(draft.timestamp));
    headers.push("Subject", encode_text(draft.subject));
    if !draft.message_id.is_empty() {
        headers.push("Message-ID", draft.message_id);
    }
    if let Some(parent) = draft.in_reply_to {
        headers.push("In-Reply-To", parent);
    }
    if let Some(references) = draft.references_header() {
        headers.push("References", references);
    }
    headers.push("MIME-Version", "1.0");

    let mut bytes = separator_line(draft.author.address(), draft.timestamp).into_bytes();
    bytes.push(b'\n');
    bytes.extend(headers.render(wrap).into_bytes());
    bytes.extend(content.headers.render(wrap).into_bytes());
    bytes.push(b'\n');
    bytes.extend(content.body);
    RenderedMessage::new(bytes)
}

/// One MIME entity: content headers plus encoded body.
struct MimePart {
    headers: HeaderBlock,
    body: Vec<u8>,
}

fn text_part(subtype: &str, content: &str) -> MimePart {
    let mut text = content.replace("\r\n", "\n").replace('\r', "\n");
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let mut headers = HeaderBlock::new();
    headers.push("Content-Type", format!("text/{subtype}; charset=\"utf-8\""));

    let too_long = text.split('\n').any(|line| line.len() > MAX_LINE_OCTETS);
    let body = if too_long {
        headers.push("Content-Transfer-Encoding", "base64");
        base64_lines(text.as_bytes())
    } else {
        let encoding = if text.is_ascii() { "7bit" } else { "8bit" };
        headers.push("Content-Transfer-Encoding", encoding);
        // Idempotent: `>From` lines no longer match.
        FROM_LINE.replace_all(&text, ">From").into_owned().into_bytes()
    };
    MimePart { headers, body }
}

fn attachment_part(attachment: &Attachment) -> MimePart {
    let mut headers = HeaderBlock::new();
    headers.push("Content-Type", attachment.content_type.as_str());
    headers.push("Content-Transfer-Encoding", "base64");
    let filename = attachment.filename.replace('\\', "\\\\").replace('"', "\\\"");
    headers.push(
        "Content-Disposition",
        format!("attachment; filename=\"{filename}\""),
    );
    MimePart {
        headers,
        body: base64_lines(&attachment.data),
    }
}

fn base64_lines(data: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(data).into_bytes();
    let mut body = Vec::with_capacity(encoded.len() + encoded.len().div_ceil(BASE64_LINE));
    for line in encoded.chunks(BASE64_LINE) {
        body.extend_from_slice(line);
        body.push(b'\n');
    }
    body
}

fn multipart(subtype: &str, seed: &str, parts: &[MimePart], wrap: Option<usize>) -> MimePart {
    let rendered: Vec<Vec<u8>> = parts
        .iter()
        .map(|part| {
            let mut bytes = part.headers.render(wrap).into_bytes();
            bytes.push(b'\n');
            bytes.extend_from_slice(&part.body);
            bytes
        })
        .collect();
    let boundary = choose_boundary(&format!("{subtype}:{seed}"), &rendered);

    let mut body = Vec::new();
    for (index, part) in rendered.iter().enumerate() {
        if index > 0 {
            body.push(b'\n');
        }
        body.extend_from_slice(format!("--{boundary}\n").as_bytes());
        body.extend_from_slice(part);
    }
    body.extend_from_slice(format!("\n--{boundary}--\n").as_bytes());

    let mut headers = HeaderBlock::new();
    headers.push(
        "Content-Type",
        format!("multipart/{subtype}; boundary=\"{boundary}\""),
    );
    MimePart { headers, body }
}

/// Derives a boundary from `seed`, re-salting until no part contains it.
fn choose_boundary(seed: &str, parts: &[Vec<u8>]) -> String {
    let mut salt: u64 = 0;
    loop {
        let candidate = format!("==============={:016x}==", fnv1a(seed, salt));
        let clashes = parts
            .iter()
            .any(|part| contains(part, candidate.as_bytes()));
        if !clashes {
            return candidate;
        }
        salt += 1;
    }
}

fn fnv1a(seed: &str, salt: u64) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    seed.bytes()
        .chain(salt.to_string().into_bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
