//! Selection ranges: expanding selection regions.
//!
//! The chain for a position is the token under it followed by every
//! enclosing node of the syntax tree.

use crate::base::{TextRange, TextSize};
use crate::hir::CacheEntry;
use crate::parser::SyntaxKind;

/// Ranges containing `offset`, innermost first, without duplicates.
///
/// Used for "Expand Selection".
pub fn selection_ranges(entry: &CacheEntry, offset: TextSize) -> Vec<TextRange> {
    let root = entry.syntax();
    if !root.text_range().contains_inclusive(offset) {
        return Vec::new();
    }

    let token = root.token_at_offset(offset).right_biased().or_else(|| root.token_at_offset(offset).left_biased());
    let Some(token) = token else {
        return vec![root.text_range()];
    };

    let mut ranges = Vec::new();
    // whitespace itself is not a useful selection
    if !token.kind().is_trivia() && !matches!(token.kind(), SyntaxKind::INDENT | SyntaxKind::DEDENT) {
        ranges.push(token.text_range());
    }
    for node in token.parent_ancestors() {
        let range = node.text_range();
        if ranges.last() != Some(&range) && !range.is_empty() {
            ranges.push(range);
        }
    }
    ranges
}

/// Selection chains for several positions at once.
pub fn selection_ranges_at(entry: &CacheEntry, offsets: &[TextSize]) -> Vec<Vec<TextRange>> {
    offsets.iter().map(|offset| selection_ranges(entry, *offset)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{StylesheetCache, TextDocument};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selection_expands_outward() {
        let text = ".a {\n  color: $primary;\n}";
        let cache = StylesheetCache::new();
        let entry = cache.insert(TextDocument::from_uri("file:///p/a.scss", 0, text));
        let offset = TextSize::from(text.find("primary").unwrap() as u32);
        let ranges = selection_ranges(&entry, offset);

        let slices: Vec<&str> = ranges.iter().map(|r| entry.document().slice(*r)).collect();
        assert_eq!(slices.first().copied(), Some("$primary"));
        assert_eq!(slices.last().copied(), Some(text));
        for pair in ranges.windows(2) {
            assert!(pair[1].contains_range(pair[0]));
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_out_of_range() {
        let cache = StylesheetCache::new();
        let entry = cache.insert(TextDocument::from_uri("file:///p/a.scss", 0, "$a: 1;"));
        assert!(selection_ranges(&entry, TextSize::from(100)).is_empty());
    }
}
