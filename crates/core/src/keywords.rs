use unicode_segmentation::UnicodeSegmentation;

pub const MAX_KEYWORDS: usize = 10;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "for",
    "of", "as", "by", "are", "was", "were", "be", "can", "could", "should", "would", "will",
    "what", "where", "when", "how", "does", "did", "you", "your", "me", "my", "there", "this",
    "that", "from", "about", "into", "please", "tell", "any", "some", "have", "has",
];

/// Lower-cased words in order of appearance, minus stop-words and one/two letter tokens.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    lower
        .unicode_words()
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(ToString::to_string)
        .collect()
}
