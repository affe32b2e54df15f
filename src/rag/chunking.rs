//! Character-based document chunking.

/// Default chunk size in characters. Roughly 250-300 words.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Split `text` into chunks of at most `chunk_size` characters, where each
/// chunk starts `chunk_size - overlap` characters after the previous one.
/// Counts are in characters, not bytes, so multibyte text splits cleanly.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello world", 1000, 200);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 1000, 200).is_empty());
        assert!(chunk_text("   ", 1000, 200).is_empty());
    }

    #[test]
    fn test_chunks_overlap() {
        let text = "abcdefghij";
        let chunks = chunk_text(text, 4, 2);
        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[1], "cdef");
        // Every character is covered.
        assert!(chunks.iter().any(|c| c.contains('j')));
    }

    #[test]
    fn test_multibyte_safe() {
        let text = "héllo wörld ünïcode".repeat(10);
        let chunks = chunk_text(&text, 50, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
