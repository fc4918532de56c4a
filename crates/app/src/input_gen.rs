//! Sample text generation for trying out the codec.
//!
//! When no input file is given, `pack` generates text with a visible
//! difference in symbol frequencies, so the code table is worth looking at.
//!
//! # Design
//!
//! Generated text has:
//! - Sentences of common English words (skewed letter frequencies)
//! - Capitalized sentence starts (exercises case folding)
//! - Occasional runs of one character (very short codes)
//! - Occasional non-ASCII words (multi-byte symbols)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WORDS: &[&str] = &[
    "the", "of", "and", "to", "in", "is", "it", "that", "was", "for", "on", "are", "with", "as",
    "his", "they", "be", "at", "one", "have", "this", "from", "or", "had", "by", "word", "but",
    "what", "some", "we", "can", "out", "other", "were", "all", "there", "when", "up", "use",
    "your", "how", "said", "an", "each", "she", "which", "do", "their", "time", "if",
];

const FOREIGN_WORDS: &[&str] = &["café", "naïve", "straße", "smörgåsbord", "日本", "😀"];

/// Generate sample text of exactly `size_bytes` UTF-8 bytes or slightly
/// less (never splitting a character).
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `size_bytes`: upper bound on the size of the generated text
pub fn generate_sample_text(seed: u64, size_bytes: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut text = String::with_capacity(size_bytes + 32);

    while text.len() < size_bytes {
        // Choose segment type randomly
        let segment_type: u8 = rng.gen_range(0..10);

        match segment_type {
            // 80% sentences
            0..=7 => push_sentence(&mut rng, &mut text),

            // 10% runs of one character
            8 => {
                let ch = if rng.gen_bool(0.5) { '-' } else { '=' };
                let len = rng.gen_range(4..=40);
                text.extend(std::iter::repeat(ch).take(len));
                text.push('\n');
            }

            // 10% non-ASCII words
            _ => {
                let word = FOREIGN_WORDS[rng.gen_range(0..FOREIGN_WORDS.len())];
                text.push_str(word);
                text.push(' ');
            }
        }
    }

    truncate_at_char_boundary(&mut text, size_bytes);
    text
}

/// Append one capitalized sentence.
fn push_sentence(rng: &mut ChaCha8Rng, text: &mut String) {
    let word_count = rng.gen_range(3..=14);

    for i in 0..word_count {
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                text.extend(first.to_uppercase());
                text.push_str(chars.as_str());
            }
        } else {
            text.push(' ');
            text.push_str(word);
        }
    }

    text.push_str(if rng.gen_bool(0.2) { "! " } else { ". " });
}

fn truncate_at_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_text() {
        let text = generate_sample_text(42, 1000);
        assert!(text.len() <= 1000);
        assert!(text.len() > 990);
    }

    #[test]
    fn test_determinism() {
        let text1 = generate_sample_text(12345, 5000);
        let text2 = generate_sample_text(12345, 5000);

        assert_eq!(text1, text2);
    }

    #[test]
    fn test_different_seeds() {
        let text1 = generate_sample_text(1, 1000);
        let text2 = generate_sample_text(2, 1000);

        assert_ne!(text1, text2);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 1000, 10000, 100000] {
            let text = generate_sample_text(999, size);
            assert!(text.len() <= size);
            assert!(size - text.len() < 4, "size {size} gave {}", text.len());
        }
    }

    #[test]
    fn test_sample_round_trips() {
        let text = generate_sample_text(7, 20_000);
        let packed = sfpack_core::encode(&text).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(sfpack_core::decode(&packed).unwrap(), text);
    }
}
