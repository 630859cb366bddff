//! Header field formatting: encoded words, mailboxes, dates and folding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use mailparse::MailAddr;

/// Sender used on the `From ` separator line when no valid address is known.
pub const UNKNOWN_SENDER: &str = "nobody";

/// Largest raw payload per encoded word; keeps each word within 75 octets.
const ENCODED_WORD_PAYLOAD: usize = 45;

const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Encodes header text as RFC 2047 `B` words when it is not plain ASCII.
///
/// Line breaks are replaced by spaces first; header values never span lines
/// except through folding.
///
/// # Example
///
/// ```
/// use hubmail::mbox::headers::encode_text;
///
/// assert_eq!(encode_text("plain"), "plain");
/// assert_eq!(encode_text("café"), "=?utf-8?b?Y2Fmw6k=?=");
/// ```
#[must_use]
pub fn encode_text(text: &str) -> String {
    let single_line: String = text
        .chars()
        .map(|ch| if matches!(ch, '\r' | '\n') { ' ' } else { ch })
        .collect();
    if single_line.is_ascii() {
        return single_line;
    }

    encoded_word_chunks(&single_line)
        .into_iter()
        .map(|chunk| format!("=?utf-8?b?{}?=", STANDARD.encode(chunk.as_bytes())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn encoded_word_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > ENCODED_WORD_PAYLOAD {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Returns true when `address` is a bare, parseable `local@domain` addr-spec.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    if address.is_empty() || address.trim() != address || !address.contains('@') {
        return false;
    }

    mailparse::addrparse(address).is_ok_and(|list| {
        list.len() == 1
            && matches!(
                list.first(),
                Some(MailAddr::Single(info))
                    if info.addr == address && info.display_name.is_none()
            )
    })
}

/// Formats a `From` mailbox.
///
/// Produces `name <address>` for a valid address and the bare display name
/// otherwise.
#[must_use]
pub fn format_mailbox(name: &str, address: &str) -> String {
    let display = format_display_name(name);
    if !is_valid_address(address) {
        return display;
    }
    if display.is_empty() {
        return address.to_owned();
    }
    format!("{display} <{address}>")
}

fn format_display_name(name: &str) -> String {
    if !name.is_ascii() {
        return encode_text(name);
    }
    if name.contains(SPECIALS) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        return format!("\"{escaped}\"");
    }
    name.to_owned()
}

/// Formats an RFC 2822 `Date` value, e.g. `Thu, 04 Mar 2021 05:06:07 +0000`.
#[must_use]
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// Builds the mbox separator line (without trailing newline).
///
/// The sender is `address` when valid, else [`UNKNOWN_SENDER`]; the date is
/// the message timestamp in `asctime` form.
#[must_use]
pub fn separator_line(address: &str, timestamp: DateTime<Utc>) -> String {
    let sender = if is_valid_address(address) {
        address
    } else {
        UNKNOWN_SENDER
    };
    format!("From {sender} {}", timestamp.format("%a %b %e %H:%M:%S %Y"))
}

/// Folds one `Name: value` line so no physical line exceeds `width`.
///
/// Folding replaces a single space with a newline followed by that space, so
/// words are never split. Tokens longer than the width stay on an overlong
/// line, and no fold is placed directly after the field name.
#[must_use]
pub fn fold_line(line: &str, width: usize) -> String {
    if width == 0 || line.chars().count() <= width {
        return line.to_owned();
    }

    let mut words = line.split(' ');
    let mut folded = String::with_capacity(line.len() + 8);
    let mut current = String::new();
    if let Some(name) = words.next() {
        current.push_str(name);
    }
    if let Some(first) = words.next() {
        current.push(' ');
        current.push_str(first);
    }

    for word in words {
        let current_width = current.chars().count();
        if current_width + 1 + word.chars().count() > width && !current.trim().is_empty() {
            folded.push_str(&current);
            folded.push('\n');
            current.clear();
        }
        current.push(' ');
        current.push_str(word);
    }
    folded.push_str(&current);
    folded
}

/// Ordered header fields of one message or MIME part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    fields: Vec<(String, String)>,
}

impl HeaderBlock {
    /// Creates an empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field; the value must already be encoded.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.fields.push((name.to_owned(), value.into()));
    }

    /// Removes every field called `name` (case-insensitive), returning the
    /// first removed value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let mut removed = None;
        self.fields.retain(|(key, value)| {
            if key.eq_ignore_ascii_case(name) {
                if removed.is_none() {
                    removed = Some(value.clone());
                }
                false
            } else {
                true
            }
        });
        removed
    }

    /// Value of the first field called `name` (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Renders every field as a `\n`-terminated line, folded at `wrap` when
    /// set. The blank line separating headers from the body is not included.
    #[must_use]
    pub fn render(&self, wrap: Option<usize>) -> String {
        let mut rendered = String::new();
        for (name, value) in &self.fields {
            let line = format!("{name}: {value}");
            match wrap {
                Some(width) => rendered.push_str(&fold_line(&line, width)),
                None => rendered.push_str(&line),
            }
            rendered.push('\n');
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{
        HeaderBlock, encode_text, fold_line, format_date, format_mailbox, is_valid_address,
        separator_line,
    };

    #[rstest]
    #[case::plain("octo@example.com", true)]
    #[case::empty("", false)]
    #[case::no_at("octocat", false)]
    #[case::with_name("Octo <octo@example.com>", false)]
    #[case::padded(" octo@example.com", false)]
    fn validates_addr_specs(#[case] address: &str, #[case] valid: bool) {
        assert_eq!(is_valid_address(address), valid, "for {address:?}");
    }

    #[rstest]
    #[case::named("The Octocat", "octo@example.com", "The Octocat <octo@example.com>")]
    #[case::no_address("ghost", "", "ghost")]
    #[case::invalid_address("someone", "not an address", "someone")]
    #[case::specials("Doe, Jane", "jane@example.com", "\"Doe, Jane\" <jane@example.com>")]
    #[case::non_ascii("Zoë", "zoe@example.com", "=?utf-8?b?Wm/Dqw==?= <zoe@example.com>")]
    fn formats_mailboxes(#[case] name: &str, #[case] address: &str, #[case] expected: &str) {
        assert_eq!(format_mailbox(name, address), expected);
    }

    #[rstest]
    fn long_non_ascii_text_splits_into_several_words() {
        let encoded = encode_text(&"é".repeat(40));

        let words: Vec<&str> = encoded.split(' ').collect();
        assert_eq!(words.len(), 2, "80 bytes need two encoded words");
        assert!(words.iter().all(|word| word.len() <= 75));
        assert!(words.iter().all(|word| word.starts_with("=?utf-8?b?")));
    }

    #[rstest]
    fn strips_line_breaks_from_header_text() {
        assert_eq!(encode_text("line one\r\nline two"), "line one  line two");
    }

    #[rstest]
    fn formats_dates() {
        let timestamp = Utc
            .with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
            .single()
            .expect("valid timestamp");

        assert_eq!(format_date(timestamp), "Thu, 04 Mar 2021 05:06:07 +0000");
        assert_eq!(
            separator_line("octo@example.com", timestamp),
            "From octo@example.com Thu Mar  4 05:06:07 2021"
        );
        assert_eq!(
            separator_line("", timestamp),
            "From nobody Thu Mar  4 05:06:07 2021"
        );
    }

    #[rstest]
    fn folds_at_spaces_without_breaking_words() {
        let line = "Subject: alpha beta gamma delta epsilon";

        let folded = fold_line(line, 20);

        assert_eq!(folded, "Subject: alpha beta\n gamma delta epsilon");
        assert_eq!(folded.replace("\n ", " "), line, "unfolding restores the line");
    }

    #[rstest]
    fn keeps_overlong_tokens_whole() {
        let line = "References: <a-very-long-message-id@github.com> <x@github.com>";

        let folded = fold_line(line, 20);

        assert_eq!(
            folded,
            "References: <a-very-long-message-id@github.com>\n <x@github.com>"
        );
    }

    #[rstest]
    fn header_block_preserves_order_and_moves_on_reinsert() {
        let mut block = HeaderBlock::new();
        block.push("From", "a");
        block.push("Subject", "s");
        block.push("Date", "d");

        let subject = block.remove("subject");
        block.push("Subject", subject.unwrap_or_default());

        assert_eq!(block.names().collect::<Vec<_>>(), vec!["From", "Date", "Subject"]);
        assert_eq!(block.render(None), "From: a\nDate: d\nSubject: s\n");
    }
}
