//! Splitting of `git format-patch` mailboxes into threaded sub-messages.
//!
//! The mailbox GitHub serves at `<pull url>.patch` holds one message per
//! commit. Each is re-emitted with its body bytes untouched and its headers
//! extended so that mail readers thread it under the pull request message.

use std::sync::LazyLock;

use mailparse::MailHeader;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use crate::github::{HubmailError, ThreadLocator};

use super::headers::{HeaderBlock, encode_text};
use super::writer::RenderedMessage;

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
static MESSAGE_START: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?m)^From ").expect("separator pattern is valid"));

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
static PATCH_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[PATCH( .*?)?\]").expect("subject pattern is valid"));

/// Splits a pull request's patch mailbox into per-commit messages.
#[derive(Debug, Clone)]
pub struct PatchSplitter<'a> {
    locator: &'a ThreadLocator,
    wrap: Option<usize>,
    extended_subject: bool,
}

impl<'a> PatchSplitter<'a> {
    /// Creates a splitter threading commits under `locator`'s root message.
    #[must_use]
    pub fn new(locator: &'a ThreadLocator, wrap: Option<usize>, extended_subject: bool) -> Self {
        Self {
            locator,
            wrap: wrap.filter(|width| *width > 0),
            extended_subject,
        }
    }

    /// Splits `raw` into one message per commit, in mailbox order.
    ///
    /// Text before the first `From ` line is ignored; a mailbox without any
    /// separator yields no messages.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::MalformedPatch`] when a message lacks its
    /// separator line terminator or the blank line after its headers, or
    /// when the header block cannot be parsed.
    pub fn split(&self, raw: &[u8]) -> Result<Vec<RenderedMessage>, HubmailError> {
        MESSAGE_START
            .split(raw)
            .skip(1)
            .map(|block| self.render_block(block))
            .collect()
    }

    fn render_block(&self, block: &[u8]) -> Result<RenderedMessage, HubmailError> {
        let (unixfrom, rest) = split_once(block, b"\n")
            .ok_or_else(|| malformed(block, "missing end of separator line"))?;
        let commit = String::from_utf8_lossy(
            unixfrom
                .split(|byte| *byte == b' ')
                .next()
                .unwrap_or_default(),
        )
        .into_owned();

        let (raw_headers, body) = if let Some(body) = rest.strip_prefix(b"\n") {
            (&[][..], body)
        } else {
            split_once(rest, b"\n\n").ok_or_else(|| {
                malformed(block, &format!("commit {commit}: no blank line after headers"))
            })?
        };

        let mut headers = self.parse_headers(raw_headers, &commit)?;
        if self.extended_subject
            && let Some(subject) = headers.remove("Subject")
        {
            headers.push("Subject", encode_text(&self.tag_subject(&subject)));
        }

        let root = self.locator.message_id();
        headers.push("Message-ID", self.locator.commit_message_id(&commit));
        headers.push("In-Reply-To", root.as_str());
        headers.push("References", root);

        let mut bytes = Vec::with_capacity(block.len() + 256);
        bytes.extend_from_slice(b"From ");
        bytes.extend_from_slice(unixfrom);
        bytes.push(b'\n');
        bytes.extend(headers.render(self.wrap).into_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(body);
        Ok(RenderedMessage::verbatim(bytes))
    }

    /// Parses and unfolds the header block. `Subject` is stored decoded so it
    /// can be retagged; every other value keeps its source encoding.
    fn parse_headers(&self, raw: &[u8], commit: &str) -> Result<HeaderBlock, HubmailError> {
        let mut terminated = raw.to_vec();
        terminated.extend_from_slice(b"\n\n");
        let (parsed, _) = mailparse::parse_headers(&terminated).map_err(|error| {
            HubmailError::MalformedPatch {
                message: format!("commit {commit}: {error}"),
            }
        })?;

        let mut headers = HeaderBlock::new();
        for header in &parsed {
            let name = header.get_key();
            let value = if self.extended_subject && name.eq_ignore_ascii_case("Subject") {
                header.get_value()
            } else {
                unfolded_raw_value(header)
            };
            headers.push(&name, value);
        }
        Ok(headers)
    }

    fn tag_subject(&self, subject: &str) -> String {
        let repository = self.locator.repository().slug();
        let number = self.locator.number();
        PATCH_TAG
            .replace(subject, |captures: &regex::Captures<'_>| {
                let detail = captures.get(1).map_or("", |found| found.as_str());
                format!("[PATCH {repository}#{number}{detail}]")
            })
            .into_owned()
    }
}

fn unfolded_raw_value(header: &MailHeader<'_>) -> String {
    String::from_utf8_lossy(header.get_value_raw())
        .replace("\r\n", "")
        .replace('\n', "")
        .trim()
        .to_owned()
}

fn split_once<'b>(haystack: &'b [u8], needle: &[u8]) -> Option<(&'b [u8], &'b [u8])> {
    let position = haystack
        .windows(needle.len())
        .position(|window| window == needle)?;
    let head = haystack.get(..position)?;
    let tail = haystack.get(position + needle.len()..)?;
    Some((head, tail))
}

fn malformed(block: &[u8], detail: &str) -> HubmailError {
    let preview: String = String::from_utf8_lossy(block).chars().take(40).collect();
    HubmailError::MalformedPatch {
        message: format!("{detail} (near {preview:?})"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::PatchSplitter;
    use crate::github::{HubmailError, ThreadLocator};

    const SERIES: &[u8] = b"From 1111111111111111111111111111111111111111 Mon Sep 17 00:00:00 2001\n\
From: Octo Cat <octo@example.com>\n\
Date: Thu, 4 Mar 2021 05:06:07 +0000\n\
Subject: [PATCH 1/2] Add the\n first part\n\
\n\
Body line one\r\n\
---\n file | 1 +\n\
\n\
From 2222222222222222222222222222222222222222 Mon Sep 17 00:00:00 2001\n\
From: Octo Cat <octo@example.com>\n\
Date: Thu, 4 Mar 2021 05:07:07 +0000\n\
Subject: [PATCH 2/2] Second part\n\
\n\
-- \n2.30.0\n";

    #[fixture]
    fn locator() -> ThreadLocator {
        ThreadLocator::parse("https://github.com/octo/repo/pull/7").expect("valid locator")
    }

    #[rstest]
    fn splits_one_message_per_commit(locator: ThreadLocator) {
        let messages = PatchSplitter::new(&locator, None, false)
            .split(SERIES)
            .expect("series should split");

        assert_eq!(messages.len(), 2);
        let first = messages.first().expect("first message").to_text();
        assert!(first.starts_with(
            "From 1111111111111111111111111111111111111111 Mon Sep 17 00:00:00 2001\n"
        ));
        assert!(first.contains(
            "Subject: [PATCH 1/2] Add the first part\n\
Message-ID: <octo/repo/pull/7/1111111111111111111111111111111111111111@github.com>\n\
In-Reply-To: <octo/repo/pull/7@github.com>\n\
References: <octo/repo/pull/7@github.com>\n\n"
        ));
    }

    #[rstest]
    fn body_bytes_are_untouched(locator: ThreadLocator) {
        let messages = PatchSplitter::new(&locator, Some(20), false)
            .split(SERIES)
            .expect("series should split");

        let first = messages.first().expect("first message").as_bytes();
        let body_start = first
            .windows(2)
            .position(|w| w == b"\n\n")
            .expect("header terminator")
            + 2;
        assert_eq!(
            first.get(body_start..),
            Some(&b"Body line one\r\n---\n file | 1 +\n\n"[..])
        );
    }

    #[rstest]
    fn final_body_without_newline_is_kept_exactly(locator: ThreadLocator) {
        let raw = b"From abc Mon Sep 17 00:00:00 2001\nSubject: x\n\n-- \n2.30.0";

        let messages = PatchSplitter::new(&locator, None, false)
            .split(raw)
            .expect("series should split");

        let message = messages.first().expect("one message").as_bytes();
        assert!(message.ends_with(b"\n\n-- \n2.30.0"), "got {message:?}");
    }

    #[rstest]
    fn extended_subject_is_tagged_and_moved_last(locator: ThreadLocator) {
        let messages = PatchSplitter::new(&locator, None, true)
            .split(SERIES)
            .expect("series should split");

        let second = messages.get(1).expect("second message").to_text();
        let header_names: Vec<&str> = second
            .lines()
            .skip(1)
            .take_while(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':').map(|(name, _)| name))
            .collect();
        assert_eq!(
            header_names,
            vec!["From", "Date", "Subject", "Message-ID", "In-Reply-To", "References"]
        );
        assert!(second.contains("Subject: [PATCH octo/repo#7 2/2] Second part\n"));
    }

    #[rstest]
    #[case::bare("[PATCH] Fix", "[PATCH octo/repo#7] Fix")]
    #[case::numbered("[PATCH v2 3/5] Fix", "[PATCH octo/repo#7 v2 3/5] Fix")]
    #[case::untagged("Fix [PATCH]", "Fix [PATCH]")]
    fn tags_patch_prefix(locator: ThreadLocator, #[case] subject: &str, #[case] expected: &str) {
        let splitter = PatchSplitter::new(&locator, None, true);
        assert_eq!(splitter.tag_subject(subject), expected);
    }

    #[rstest]
    fn headers_are_refolded_at_wrap(locator: ThreadLocator) {
        let messages = PatchSplitter::new(&locator, Some(30), false)
            .split(SERIES)
            .expect("series should split");

        let first = messages.first().expect("first message").to_text();
        assert!(first.contains("Subject: [PATCH 1/2] Add the\n first part\n"));
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::no_separator(b"not a mailbox\n".as_slice())]
    fn no_separator_yields_nothing(locator: ThreadLocator, #[case] raw: &[u8]) {
        let messages = PatchSplitter::new(&locator, None, false)
            .split(raw)
            .expect("empty input is fine");
        assert!(messages.is_empty());
    }

    #[rstest]
    fn missing_blank_line_is_malformed(locator: ThreadLocator) {
        let result = PatchSplitter::new(&locator, None, false)
            .split(b"From abc Mon Sep 17 00:00:00 2001\nSubject: x\nno blank line\n");

        assert!(
            matches!(result, Err(HubmailError::MalformedPatch { ref message }) if message.contains("abc")),
            "expected MalformedPatch, got {result:?}"
        );
    }
}
