//! Toolbar helper: wrap the selected part of a draft in a marker pair.

use serde::{Deserialize, Serialize};

use super::Style;

/// Half-open character range `[start, end)` inside a draft.
///
/// Offsets count `char`s, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Result of a successful [`apply_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    /// The whole draft with the marker pair inserted.
    pub text: String,
    /// Selection covering the inserted text, markers included.
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Please select text to format")]
    EmptySelection,

    #[error("Selection {start}..{end} is outside the draft ({len} characters)")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Wrap `selection` of `draft` in the marker pair for `style`.
///
/// An empty selection is rejected and nothing changes.
pub fn apply_format(
    draft: &str,
    selection: Selection,
    style: Style,
) -> Result<Formatted, FormatError> {
    if selection.is_empty() {
        return Err(FormatError::EmptySelection);
    }

    let len = draft.chars().count();
    let (Some(start), Some(end)) = (
        byte_offset(draft, selection.start),
        byte_offset(draft, selection.end),
    ) else {
        return Err(FormatError::OutOfBounds {
            start: selection.start,
            end: selection.end,
            len,
        });
    };

    let marker = style.marker();
    let selected = &draft[start..end];

    let mut text = String::with_capacity(draft.len() + 2 * marker.len_utf8());
    text.push_str(&draft[..start]);
    text.push(marker);
    text.push_str(selected);
    text.push(marker);
    text.push_str(&draft[end..]);

    Ok(Formatted {
        text,
        selection: Selection::new(selection.start, selection.end + 2),
    })
}

/// Byte offset of the `char_index`-th character; `len` maps to the end.
fn byte_offset(s: &str, char_index: usize) -> Option<usize> {
    s.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(s.len()))
        .nth(char_index)
}
