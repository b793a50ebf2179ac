//! Reply segmentation and ordered chunk delivery.

use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use crate::error::DiscordError;

/// Split `text` into chunks of at most `max_len` characters.
///
/// Lines are packed greedily; a chunk boundary only falls inside a line when
/// that line alone exceeds `max_len`, in which case it is cut into
/// `max_len`-character slices. Packed chunks are trimmed. Text that already
/// fits (including the empty string) is returned unchanged as one chunk.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if char_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = char_len(line);

        if current_len + line_len + 1 > max_len {
            flush(&mut chunks, &mut current);
            current_len = 0;

            if line_len > max_len {
                chunks.extend(hard_split(line, max_len));
                continue;
            }
        }

        current.push_str(line);
        current.push('\n');
        current_len += line_len + 1;
    }

    flush(&mut chunks, &mut current);
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Cut a single over-long line at fixed character offsets.
fn hard_split(line: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_len)
        .map(|slice| slice.iter().collect())
        .collect()
}

/// Send `text` to `channel_id` in chunks of at most `max_len` characters.
///
/// The first chunk replies to `reply_to` (when given); the rest follow as
/// plain messages, strictly in order. Blank chunks are skipped. Stops at the
/// first failed send.
pub async fn send_response(
    http: &Http,
    channel_id: ChannelId,
    reply_to: Option<MessageId>,
    text: &str,
    max_len: usize,
) -> Result<(), DiscordError> {
    let mut reference = reply_to;
    for chunk in split_chunks(text, max_len) {
        if chunk.trim().is_empty() {
            continue;
        }
        let mut message = CreateMessage::new().content(chunk);
        if let Some(id) = reference.take() {
            message = message.reference_message((channel_id, id));
        }
        channel_id.send_message(http, message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split_chunks("Hello, world!", 2000), vec!["Hello, world!"]);
    }

    #[test]
    fn text_that_fits_is_untouched() {
        let text = "  padded\n\nlines  ";
        assert_eq!(split_chunks(text, 2000), vec![text]);
    }

    #[test]
    fn empty_text_is_one_empty_chunk() {
        assert_eq!(split_chunks("", 10), vec![""]);
    }

    #[test]
    fn two_lines_that_fit_stay_together() {
        assert_eq!(split_chunks("hello\nworld", 20), vec!["hello\nworld"]);
    }

    #[test]
    fn single_long_line_is_hard_split() {
        assert_eq!(split_chunks("abcdefghijk", 10), vec!["abcdefghij", "k"]);
    }

    #[test]
    fn hard_split_count_is_ceiling() {
        let line = "x".repeat(45);
        let chunks = split_chunks(&line, 10);
        assert_eq!(chunks.len(), 5);
        assert!(chunks[..4].iter().all(|c| c.len() == 10));
        assert_eq!(chunks[4].len(), 5);
    }

    #[test]
    fn lines_are_packed_without_splitting() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let chunks = split_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc\ndddd"]);
    }

    #[test]
    fn long_line_between_short_ones() {
        let text = "head\nabcdefghijklmno\ntail";
        let chunks = split_chunks(text, 10);
        assert_eq!(chunks, vec!["head", "abcdefghij", "klmno", "tail"]);
    }

    #[test]
    fn every_chunk_respects_limit() {
        let text: String = (0..200)
            .map(|i| "word ".repeat(i % 17 + 1))
            .collect::<Vec<_>>()
            .join("\n");
        for max in [5, 16, 64, 2000] {
            for chunk in split_chunks(&text, max) {
                assert!(chunk.chars().count() <= max, "chunk over {max}: {chunk:?}");
            }
        }
    }

    #[test]
    fn rejoined_chunks_preserve_lines() {
        let lines: Vec<String> = (0..50).map(|i| format!("line number {i}")).collect();
        let text = lines.join("\n");
        let chunks = split_chunks(&text, 64);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Each 'é' is two bytes in UTF-8.
        let text = "é".repeat(12);
        let chunks = split_chunks(&text, 10);
        assert_eq!(chunks, vec!["é".repeat(10), "é".repeat(2)]);
        assert_eq!(split_chunks(&"é".repeat(10), 10).len(), 1);
    }

    #[test]
    fn blank_lines_do_not_produce_blank_chunks() {
        let text = format!("{}\n\n\n\n{}", "a".repeat(8), "b".repeat(8));
        let chunks = split_chunks(&text, 10);
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        assert_eq!(chunks, vec!["a".repeat(8), "b".repeat(8)]);
    }
}
