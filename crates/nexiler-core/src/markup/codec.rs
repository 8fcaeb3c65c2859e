//! Encoding between authored drafts and the stored body string.

use serde::Serialize;

use super::Style;

/// Literal token that replaces a line break in stored content.
pub const LINE_BREAK_TOKEN: &str = "[BR]";

/// Turn an authored draft into its stored form.
///
/// Each `\n` (a `\r\n` pair counts as one) becomes [`LINE_BREAK_TOKEN`]. Marker
/// characters pass through untouched: they are neither validated nor escaped.
///
/// Re-encoding already encoded content is not supported; load stored content
/// back through [`to_draft`] before editing it.
pub fn encode(draft: &str) -> String {
    let mut out = String::with_capacity(draft.len());
    let mut chars = draft.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str(LINE_BREAK_TOKEN);
            }
            '\n' => out.push_str(LINE_BREAK_TOKEN),
            _ => out.push(c),
        }
    }

    out
}

/// Inverse of the line-break half of [`encode`]: stored content back to an
/// editable draft.
pub fn to_draft(stored: &str) -> String {
    stored.replace(LINE_BREAK_TOKEN, "\n")
}

/// A run of text with at most one style applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(style: Style, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }
}

/// One line of decoded content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text.is_empty())
    }

    /// Re-emit the line in marker syntax, exactly as it was stored.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span.style {
                Some(style) => {
                    out.push(style.marker());
                    out.push_str(&span.text);
                    out.push(style.marker());
                }
                None => out.push_str(&span.text),
            }
        }
        out
    }
}

/// Decoded post body, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub lines: Vec<Line>,
}

impl Document {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Decode stored content into styled lines. Never fails.
pub fn decode(stored: &str) -> Document {
    Document {
        lines: stored.split(LINE_BREAK_TOKEN).map(decode_line).collect(),
    }
}

/// Nearest-pair scan over one line.
///
/// A marker opens a span only if the same character shows up again later on the
/// line with something in between. The enclosed text is taken literally, so
/// nested markers are displayed as typed.
fn decode_line(segment: &str) -> Line {
    let chars: Vec<char> = segment.chars().collect();
    let mut spans = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(style) = Style::from_marker(c) {
            let partner = chars[i + 1..].iter().position(|&next| next == c);
            match partner {
                // Empty pair, e.g. `##`
                Some(0) => {
                    literal.push(c);
                    literal.push(c);
                    i += 2;
                    continue;
                }
                Some(offset) => {
                    let close = i + 1 + offset;
                    if !literal.is_empty() {
                        spans.push(Span::plain(std::mem::take(&mut literal)));
                    }
                    spans.push(Span::styled(
                        style,
                        chars[i + 1..close].iter().collect::<String>(),
                    ));
                    i = close + 1;
                    continue;
                }
                None => {}
            }
        }

        literal.push(c);
        i += 1;
    }

    if !literal.is_empty() {
        spans.push(Span::plain(literal));
    }

    Line { spans }
}
