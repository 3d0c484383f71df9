/*!
 * Chunking of paragraphs into backend batches, and splitting of oversized
 * paragraphs into sentence-bounded parts.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::Paragraph;

/// Sentence punctuation followed by whitespace
static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]\s+").expect("sentence pattern is valid")
});

/// Size limits of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    /// Maximum total characters, unless the chunk holds a single paragraph
    pub max_chars: usize,
    /// Maximum number of paragraphs
    pub max_paragraphs: usize,
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self {
            max_chars: 1800,
            max_paragraphs: 6,
        }
    }
}

/// An ordered, non-empty batch of paragraphs translated in one backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    paragraphs: Vec<Paragraph>,
}

impl Chunk {
    fn start(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Paragraph texts in order, as sent to a backend
    pub fn texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::char_count).sum()
    }
}

/// Greedily pack paragraphs into chunks.
///
/// Whitespace-only paragraphs are skipped. A paragraph larger than the
/// character budget still gets a chunk of its own; it is only split later,
/// if translating it as a whole fails.
pub fn make_chunks(paragraphs: &[Paragraph], budget: ChunkBudget) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Option<Chunk> = None;
    let mut current_chars = 0;

    for paragraph in paragraphs.iter().filter(|p| p.is_translatable()) {
        let chars = paragraph.char_count();
        match current.as_mut() {
            Some(chunk)
                if current_chars + chars <= budget.max_chars
                    && chunk.len() < budget.max_paragraphs =>
            {
                chunk.paragraphs.push(paragraph.clone());
                current_chars += chars;
            }
            _ => {
                if let Some(full) = current.take() {
                    chunks.push(full);
                }
                current = Some(Chunk::start(paragraph.clone()));
                current_chars = chars;
            }
        }
    }

    if let Some(last) = current {
        chunks.push(last);
    }

    chunks
}

/// Cut text into pieces of at most `max_chars` characters
pub fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Alternating sentence and whitespace tokens; concatenating them gives the input back
fn sentence_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for boundary in SENTENCE_BOUNDARY_REGEX.find_iter(text) {
        // The punctuation mark is a single byte; it stays with its sentence
        let whitespace_start = boundary.start() + 1;
        let sentence = &text[cursor..whitespace_start];
        if !sentence.is_empty() {
            tokens.push(sentence);
        }
        tokens.push(&text[whitespace_start..boundary.end()]);
        cursor = boundary.end();
    }

    if cursor < text.len() {
        tokens.push(&text[cursor..]);
    }

    tokens
}

/// Split a paragraph into parts of at most `max_chars` characters.
///
/// Parts end on sentence boundaries where possible; sentences longer than the
/// budget, and text without any boundary, are hard split. Concatenating the
/// parts gives the paragraph back.
pub fn split_long_paragraph(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let tokens = sentence_tokens(text);
    if tokens.is_empty() {
        return hard_split(text, max_chars);
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for token in tokens {
        let token_chars = token.chars().count();
        if current_chars + token_chars <= max_chars {
            current.push_str(token);
            current_chars += token_chars;
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if token_chars > max_chars {
            parts.extend(hard_split(token, max_chars));
        } else {
            current.push_str(token);
            current_chars = token_chars;
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    if parts.is_empty() {
        hard_split(text, max_chars)
    } else {
        parts
    }
}
