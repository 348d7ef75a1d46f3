//! Text tokenization and stemming utilities for search indexing.

use rust_stemmers::Stemmer;
use serde::{Deserialize, Serialize};

/// Common English stop words to filter out from indexing.
/// These high-frequency words add little value to search relevance.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Location of a token in a field's text, counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub len: usize,
}

impl Position {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }
}

/// A stemmed index term and where its source piece sits in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) term: String,
    pub(crate) position: Position,
}

/// Pieces are separated by whitespace and hyphens.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

/// Splits text into pieces and turns every piece into a stemmed term.
///
/// The recorded position covers the whole piece, including punctuation that normalization
/// strips from the term: in `"(fast)"` the term is `fast` but the position spans all six
/// chars.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<Token> {
    let mut tokens = vec![];

    // (char index, byte index) of the current piece
    let mut piece_start: Option<(usize, usize)> = None;
    let mut char_count = 0;

    for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
        if is_separator(c) {
            if let Some((start_char, start_byte)) = piece_start.take() {
                let position = Position::new(start_char, char_idx - start_char);
                index_token(&text[start_byte..byte_idx], position, &mut tokens, stemmer);
            }
        } else if piece_start.is_none() {
            piece_start = Some((char_idx, byte_idx));
        }
        char_count = char_idx + 1;
    }

    if let Some((start_char, start_byte)) = piece_start {
        let position = Position::new(start_char, char_count - start_char);
        index_token(&text[start_byte..], position, &mut tokens, stemmer);
    }

    tokens
}

/// Add a token using proper stemming algorithm, filtering out stop words.
fn index_token(piece: &str, position: Position, tokens: &mut Vec<Token>, stemmer: &Stemmer) {
    if let Some(term) = stem_piece(piece, stemmer) {
        tokens.push(Token { term, position });
    }
}

/// Trims non-alphanumeric chars from both ends and lowercases. `None` when nothing is left.
pub(crate) fn normalize_piece(piece: &str) -> Option<String> {
    let trimmed = piece.trim_matches(|c: char| !c.is_alphanumeric());
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Normalizes and stems a single piece, dropping stop words.
pub(crate) fn stem_piece(piece: &str, stemmer: &Stemmer) -> Option<String> {
    let lowercase = normalize_piece(piece)?;

    // Skip stop words
    if STOP_WORDS.contains(&lowercase.as_str()) {
        return None;
    }

    Some(stemmer.stem(&lowercase).into_owned())
}
