//! Plain-text markup dialect used for blog post bodies.
//!
//! Authors write ordinary text and wrap spans in marker pairs:
//!
//! | Marker | Style |
//! |---|---|
//! | `#text#` | bold |
//! | `*text*` | italic |
//! | `_text_` | underline |
//! | `` `text` `` | inline code |
//! | `~text~` | highlight |
//!
//! Line breaks are stored as the literal token `[BR]` so a post body fits in a
//! single flat field. There is no escape syntax: a marker character that finds
//! no partner on the same line is shown as-is, which is also how a stray `#` in
//! prose survives. Every function here is total over its input.

mod codec;
mod excerpt;
mod render;
mod selection;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use codec::{Document, LINE_BREAK_TOKEN, Line, Span, decode, encode, to_draft};
pub use excerpt::{EXCERPT_LENGTH, derive_excerpt};
pub use render::{render_html, render_text};
pub use selection::{FormatError, Formatted, Selection, apply_format};

/// Inline style selected by a marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Code,
    Highlight,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Bold,
        Style::Italic,
        Style::Underline,
        Style::Code,
        Style::Highlight,
    ];

    /// The delimiter character written on both sides of a styled span.
    pub fn marker(self) -> char {
        match self {
            Style::Bold => '#',
            Style::Italic => '*',
            Style::Underline => '_',
            Style::Code => '`',
            Style::Highlight => '~',
        }
    }

    pub fn from_marker(c: char) -> Option<Style> {
        Style::ALL.into_iter().find(|style| style.marker() == c)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Bold => "bold",
            Style::Italic => "italic",
            Style::Underline => "underline",
            Style::Code => "code",
            Style::Highlight => "highlight",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown format style: {0}")]
pub struct UnknownStyle(pub String);

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}
