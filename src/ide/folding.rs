//! Folding ranges: collapsible code regions.
//!
//! Blocks, runs of line comments, multi-line block comments and
//! `// #region` / `// #endregion` pairs.

use crate::base::TextSize;
use crate::hir::CacheEntry;
use crate::parser::{SyntaxKind, SyntaxToken};

/// Kind of a folding range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldingKind {
    Block,
    Comment,
    Region,
}

/// A folding range with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingRange {
    /// Start line (0-indexed)
    pub start_line: u32,
    /// End line (0-indexed)
    pub end_line: u32,
    pub kind: FoldingKind,
}

/// Get folding ranges for a file, sorted by start line.
pub fn folding_ranges(entry: &CacheEntry) -> Vec<FoldingRange> {
    let root = entry.syntax();
    let index = entry.document().line_index();
    let line = |offset: TextSize| index.line_col(offset).line;

    let mut ranges = Vec::new();

    for node in root.descendants().filter(|n| n.kind() == SyntaxKind::BLOCK) {
        let start = line(node.text_range().start());
        let last = node
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia() && !is_layout(t.kind()))
            .last();
        let Some(last) = last else {
            continue;
        };
        // keep the closing brace visible
        let end = if last.kind() == SyntaxKind::R_BRACE {
            line(last.text_range().start()).saturating_sub(1)
        } else {
            line(last.text_range().end())
        };
        if end > start {
            ranges.push(FoldingRange {
                start_line: start,
                end_line: end,
                kind: FoldingKind::Block,
            });
        }
    }

    let mut comment_run: Option<(u32, u32)> = None;
    let mut regions: Vec<u32> = Vec::new();
    let flush = |run: &mut Option<(u32, u32)>, ranges: &mut Vec<FoldingRange>| {
        if let Some((start, end)) = run.take() {
            if end > start {
                ranges.push(FoldingRange {
                    start_line: start,
                    end_line: end,
                    kind: FoldingKind::Comment,
                });
            }
        }
    };

    for token in root.descendants_with_tokens().filter_map(|e| e.into_token()) {
        match token.kind() {
            SyntaxKind::LINE_COMMENT | SyntaxKind::DOC_COMMENT => {
                let at = line(token.text_range().start());
                if let Some(marker) = region_marker(&token) {
                    flush(&mut comment_run, &mut ranges);
                    match marker {
                        Marker::Start => regions.push(at),
                        Marker::End => {
                            if let Some(start) = regions.pop() {
                                if at > start {
                                    ranges.push(FoldingRange {
                                        start_line: start,
                                        end_line: at,
                                        kind: FoldingKind::Region,
                                    });
                                }
                            }
                        }
                    }
                    continue;
                }
                match comment_run {
                    Some((start, end)) if at == end + 1 => comment_run = Some((start, at)),
                    _ => {
                        flush(&mut comment_run, &mut ranges);
                        comment_run = Some((at, at));
                    }
                }
            }
            SyntaxKind::BLOCK_COMMENT => {
                flush(&mut comment_run, &mut ranges);
                let range = token.text_range();
                let (start, end) = (line(range.start()), line(range.end()));
                if end > start {
                    ranges.push(FoldingRange {
                        start_line: start,
                        end_line: end,
                        kind: FoldingKind::Comment,
                    });
                }
            }
            kind if kind.is_trivia() || is_layout(kind) => {}
            _ => flush(&mut comment_run, &mut ranges),
        }
    }
    flush(&mut comment_run, &mut ranges);

    ranges.sort_by_key(|r| (r.start_line, std::cmp::Reverse(r.end_line)));
    ranges
}

enum Marker {
    Start,
    End,
}

fn region_marker(token: &SyntaxToken) -> Option<Marker> {
    let text = token.text().trim_start_matches('/').trim();
    if text.starts_with("#region") {
        Some(Marker::Start)
    } else if text.starts_with("#endregion") {
        Some(Marker::End)
    } else {
        None
    }
}

fn is_layout(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::INDENT | SyntaxKind::DEDENT | SyntaxKind::NEWLINE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{StylesheetCache, TextDocument};
    use pretty_assertions::assert_eq;

    fn fold(text: &str) -> Vec<(u32, u32, FoldingKind)> {
        let cache = StylesheetCache::new();
        let entry = cache.insert(TextDocument::from_uri("file:///p/a.scss", 0, text));
        folding_ranges(&entry)
            .into_iter()
            .map(|r| (r.start_line, r.end_line, r.kind))
            .collect()
    }

    #[test]
    fn test_blocks_and_comments() {
        let text = "// one\n// two\n.a {\n  color: red;\n  .b {\n    c: d;\n  }\n}\n/* x\n y */";
        assert_eq!(
            fold(text),
            vec![
                (0, 1, FoldingKind::Comment),
                (2, 6, FoldingKind::Block),
                (4, 5, FoldingKind::Block),
                (8, 9, FoldingKind::Comment),
            ]
        );
    }

    #[test]
    fn test_regions() {
        let text = "// #region colors\n$a: 1;\n$b: 2;\n// #endregion\n";
        assert_eq!(fold(text), vec![(0, 3, FoldingKind::Region)]);
    }

    #[test]
    fn test_single_line_block_does_not_fold() {
        assert!(fold(".a { b: c; }").is_empty());
    }
}
