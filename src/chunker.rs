//! Chunker - split raw text into bounded chunks.
//!
//! Stateless utilities, independent of the scheduler and pipeline.
//! Character counting is by Unicode scalar values, not bytes.

use tracing::debug;

use crate::types::chunk::Chunk;

/// Sentence terminators recognized by [`split_by_size`].
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Split on literal delimiter occurrences.
///
/// Each resulting piece is trimmed and assigned a sequential 1-based
/// index. An empty input yields exactly one chunk containing the
/// trimmed (empty) text. An empty delimiter yields the whole input as
/// one chunk.
pub fn split_by_delimiter(text: &str, delimiter: &str) -> Vec<Chunk> {
    if delimiter.is_empty() {
        return vec![Chunk::new(text.trim(), 1)];
    }

    let chunks: Vec<Chunk> = text
        .split(delimiter)
        .enumerate()
        .map(|(i, piece)| Chunk::new(piece.trim(), i + 1))
        .collect();

    debug!(chunks = chunks.len(), "split by delimiter");
    chunks
}

/// Greedily split into chunks of up to `max_size` characters.
///
/// Within each window the split prefers, in order:
/// 1. the nearest preceding paragraph boundary (`\n\n`) at or after 50%
///    of `max_size`,
/// 2. the nearest preceding sentence terminator followed by a space at
///    or after the same threshold,
/// 3. a hard break at exactly `max_size`.
///
/// Chunks are trimmed; pieces that trim to empty are omitted. A
/// `max_size` of zero is treated as 1.
pub fn split_by_size(text: &str, max_size: usize) -> Vec<Chunk> {
    let max_size = max_size.max(1);
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 1;

    while start < chars.len() {
        let end = if chars.len() - start <= max_size {
            chars.len()
        } else {
            find_break(&chars, start, max_size)
        };

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk::new(trimmed, index));
            index += 1;
        }
        start = end;
    }

    // Keep parity with split_by_delimiter on effectively-empty input.
    if chunks.is_empty() {
        chunks.push(Chunk::new(text.trim(), 1));
    }

    debug!(chunks = chunks.len(), max_size, "split by size");
    chunks
}

/// Find the end of the window starting at `start`, honoring boundary
/// preferences. Never exceeds `start + max_size`.
fn find_break(chars: &[char], start: usize, max_size: usize) -> usize {
    let threshold = max_size / 2;
    let window_end = start + max_size;

    // Paragraph boundary: break just past the double newline.
    let mut offset = max_size.saturating_sub(2);
    while offset >= threshold {
        let i = start + offset;
        if chars[i] == '\n' && chars[i + 1] == '\n' {
            return i + 2;
        }
        if offset == 0 {
            break;
        }
        offset -= 1;
    }

    // Sentence boundary: terminator followed by a space, break past both.
    let mut offset = max_size.saturating_sub(2);
    while offset >= threshold {
        let i = start + offset;
        if SENTENCE_TERMINATORS.contains(&chars[i]) && chars[i + 1] == ' ' {
            return i + 2;
        }
        if offset == 0 {
            break;
        }
        offset -= 1;
    }

    window_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Consume the original text chunk by chunk. Each chunk must be a
    // verbatim slice of the input, in order, separated only by
    // whitespace (the trimmed parts). Returns the unconsumed tail.
    fn consume_chunks<'a>(text: &'a str, chunks: &[Chunk]) -> Option<&'a str> {
        let mut rest = text;
        for chunk in chunks {
            rest = rest.trim_start().strip_prefix(chunk.content.as_str())?;
        }
        Some(rest)
    }

    #[test]
    fn test_split_by_delimiter_pages() {
        let chunks = split_by_delimiter(
            "Part 1\n---PAGE---\nPart 2\n---PAGE---\nPart 3",
            "\n---PAGE---\n",
        );

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "Part 1");
        assert_eq!(chunks[1].content, "Part 2");
        assert_eq!(chunks[2].content, "Part 3");
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_split_by_delimiter_empty_input() {
        let chunks = split_by_delimiter("", "---");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "");
        assert_eq!(chunks[0].index, 1);
    }

    #[test]
    fn test_split_by_delimiter_no_occurrence() {
        let chunks = split_by_delimiter("  just one piece  ", "---");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "just one piece");
    }

    #[test]
    fn test_split_by_size_fits_in_one() {
        let chunks = split_by_size("short text", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short text");
    }

    #[test]
    fn test_split_by_size_prefers_paragraph_boundary() {
        // Paragraph break at char 8, which is past 50% of max_size 12.
        let text = "Alpha A.\n\nBeta B and more text after";
        let chunks = split_by_size(text, 12);

        assert_eq!(chunks[0].content, "Alpha A.");
        assert!(chunks[1].content.starts_with("Beta"));
    }

    #[test]
    fn test_split_by_size_prefers_sentence_boundary() {
        let text = "One two. Three four five six seven";
        let chunks = split_by_size(text, 12);

        // Sentence break after "One two. " (offset 8, past 50% of 12).
        assert_eq!(chunks[0].content, "One two.");
        assert!(chunks[1].content.starts_with("Three"));
    }

    #[test]
    fn test_split_by_size_hard_break_without_boundary() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split_by_size(text, 10);

        assert_eq!(chunks[0].content, "abcdefghij");
        assert_eq!(chunks[1].content, "klmnopqrst");
        assert_eq!(chunks[2].content, "uvwxyz");
    }

    #[test]
    fn test_split_by_size_ignores_boundary_below_threshold() {
        // The only sentence break sits at offset 3, below 50% of 20,
        // and the text has no later boundary: hard break at 20.
        let text = "Ab. cdefghijklmnopqrstuvwxyz0123";
        let chunks = split_by_size(text, 20);

        assert_eq!(chunks[0].len_chars(), 20);
    }

    #[test]
    fn test_split_by_size_indices_sequential() {
        let text = "para one\n\npara two\n\npara three\n\npara four";
        let chunks = split_by_size(text, 12);

        let indices: Vec<_> = chunks.iter().map(|c| c.index).collect();
        let expected: Vec<_> = (1..=chunks.len()).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_split_by_size_round_trips_content() {
        let text = "First sentence here. Second sentence there.\n\nA new paragraph with more words. And a final one.";
        let chunks = split_by_size(text, 30);

        let tail = consume_chunks(text, &chunks).expect("chunks are ordered slices of the input");
        assert!(tail.trim().is_empty(), "unconsumed content: {tail:?}");
    }

    #[test]
    fn test_split_by_size_zero_treated_as_one() {
        let chunks = split_by_size("ab", 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "a");
    }

    proptest! {
        #[test]
        fn prop_chunks_never_exceed_max_size(
            text in "[a-z .!?\n]{0,400}",
            max_size in 4usize..64,
        ) {
            for chunk in split_by_size(&text, max_size) {
                prop_assert!(chunk.len_chars() <= max_size);
            }
        }

        #[test]
        fn prop_chunks_are_ordered_slices_of_input(
            text in "[a-z .!?\n]{0,400}",
            max_size in 4usize..64,
        ) {
            let chunks = split_by_size(&text, max_size);
            let tail = consume_chunks(&text, &chunks);
            prop_assert!(tail.is_some_and(|t| t.trim().is_empty()));
        }

        #[test]
        fn prop_trimmed_chunks_nonempty(
            text in "[a-z .!?\n]{1,400}",
            max_size in 4usize..64,
        ) {
            let chunks = split_by_size(&text, max_size);
            if text.trim().is_empty() {
                prop_assert_eq!(chunks.len(), 1);
            } else {
                for chunk in chunks {
                    prop_assert!(!chunk.content.is_empty());
                }
            }
        }
    }
}
