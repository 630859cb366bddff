//! Paragraph filling for plain-text message bodies.
//!
//! Each input line is filled independently. Words are the runs of
//! non-whitespace between ASCII whitespace runs; nothing is collapsed or
//! expanded, so tabs and repeated spaces survive inside a line. Words longer
//! than the width are never broken and hyphens are never break points.
//!
//! Quoted lines keep their quoting on continuation lines: a line starting
//! with `"> "` continues with `"> "`, any other line starting with `>`
//! continues with `">"`.

/// Fills every line of `text` to `width` columns.
///
/// A width of zero returns the text unchanged. Otherwise lines are split the
/// way a line iterator splits them (a final line terminator does not produce
/// an empty trailing line) and rejoined with `\n`.
///
/// # Example
///
/// ```
/// use hubmail::mbox::wrap::fill_text;
///
/// let filled = fill_text("> one two three four", 12);
/// assert_eq!(filled, "> one two\n> three four");
/// ```
#[must_use]
pub fn fill_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }

    split_lines(text)
        .into_iter()
        .map(|line| fill_line(line, width, hanging_indent(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Continuation prefix for a line: its quote marker, if any.
#[must_use]
pub fn hanging_indent(line: &str) -> &'static str {
    if line.starts_with("> ") {
        "> "
    } else if line.starts_with('>') {
        ">"
    } else {
        ""
    }
}

/// Fills a single line, prefixing continuation lines with `indent`.
///
/// Whitespace at the start of a continuation line and at the end of any
/// output line is dropped; a whitespace-only line becomes empty.
#[must_use]
pub fn fill_line(line: &str, width: usize, indent: &str) -> String {
    let mut chunks = split_chunks(line);
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let prefix = if lines.is_empty() { "" } else { indent };
        let available = width.saturating_sub(char_len(prefix));

        if !lines.is_empty() && chunks.last().is_some_and(|chunk| is_blank(chunk)) {
            chunks.pop();
        }

        let mut current = LineBuilder::default();
        while let Some(chunk) = chunks.last() {
            if current.width + char_len(chunk) > available {
                break;
            }
            current.push(chunk);
            chunks.pop();
        }

        // An over-long word goes on a line of its own, unbroken.
        if current.is_empty()
            && let Some(chunk) = chunks.pop()
        {
            current.push(chunk);
        }

        current.drop_trailing_blank();
        if !current.is_empty() {
            lines.push(format!("{prefix}{}", current.chunks.concat()));
        }
    }

    lines.join("\n")
}

#[derive(Default)]
struct LineBuilder<'a> {
    chunks: Vec<&'a str>,
    width: usize,
}

impl<'a> LineBuilder<'a> {
    fn push(&mut self, chunk: &'a str) {
        self.width += char_len(chunk);
        self.chunks.push(chunk);
    }

    const fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn drop_trailing_blank(&mut self) {
        if self.chunks.last().is_some_and(|chunk| is_blank(chunk))
            && let Some(chunk) = self.chunks.pop()
        {
            self.width -= char_len(chunk);
        }
    }
}

const fn is_break_whitespace(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0b' | '\x0c' | '\r' | ' ')
}

fn is_blank(chunk: &str) -> bool {
    chunk.trim().is_empty()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits a line into alternating whitespace and word chunks.
fn split_chunks(line: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_whitespace = None;

    for (index, ch) in line.char_indices() {
        let whitespace = is_break_whitespace(ch);
        if in_whitespace.is_some_and(|previous| previous != whitespace) {
            chunks.extend(line.get(start..index));
            start = index;
        }
        in_whitespace = Some(whitespace);
    }
    chunks.extend(line.get(start..).filter(|rest| !rest.is_empty()));
    chunks
}

const fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits on every line boundary, treating `\r\n` as one boundary.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if !is_line_boundary(ch) {
            continue;
        }
        lines.extend(text.get(start..index));
        start = index + ch.len_utf8();
        if ch == '\r'
            && let Some(&(next_index, '\n')) = chars.peek()
        {
            chars.next();
            start = next_index + 1;
        }
    }
    lines.extend(text.get(start..).filter(|rest| !rest.is_empty()));
    lines
}
