/// Number of characters kept in a post excerpt.
pub const EXCERPT_LENGTH: usize = 150;

/// Excerpt of an unencoded draft: the first [`EXCERPT_LENGTH`] characters
/// with each newline turned into a single space.
///
/// Markers are kept as typed. The excerpt is derived once at save time and is
/// not kept in step with later content edits.
pub fn derive_excerpt(draft: &str) -> String {
    draft
        .chars()
        .take(EXCERPT_LENGTH)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}
