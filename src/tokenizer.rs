//! Whitespace tokenizer

/// Split `text` into its maximal non-whitespace runs, left to right.
///
/// Any Unicode whitespace separates tokens. Leading and trailing whitespace
/// produce no empty tokens, and runs of separators collapse.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Number of tokens `tokenize` would return
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}
