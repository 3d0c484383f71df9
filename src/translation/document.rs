/*!
 * Document model: segmentation and reassembly.
 *
 * A document is split into paragraphs separated by blank-line runs. The
 * separators are kept verbatim so that substituting paragraph texts back
 * into the segment list reproduces the input byte for byte.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// A newline, optional whitespace, then one or more further newlines
static SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n+").expect("separator pattern is valid")
});

/// A run of text between blank-line separators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Position in document order
    pub index: usize,
    /// Original text
    pub text: String,
}

impl Paragraph {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length in characters, the unit of every budget
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the paragraph has anything worth sending to a backend
    pub fn is_translatable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// One element of the document skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Placeholder for the paragraph with this index
    Paragraph(usize),
    /// Separator text, reproduced verbatim
    Separator(String),
}

/// Partial mapping from paragraph index to translated text.
/// Absent indices mean "use the original text".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    translations: HashMap<usize, String>,
}

impl TranslationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, text: String) {
        self.translations.insert(index, text);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.translations.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Merge another result into this one
    pub fn extend(&mut self, other: TranslationResult) {
        self.translations.extend(other.translations);
    }
}

/// Split text into its segment skeleton and paragraph list
pub fn segment_text(text: &str) -> (Vec<Segment>, Vec<Paragraph>) {
    let mut segments = Vec::new();
    let mut paragraphs = Vec::new();
    let mut cursor = 0;

    for separator in SEPARATOR_REGEX.find_iter(text) {
        let index = paragraphs.len();
        paragraphs.push(Paragraph::new(index, &text[cursor..separator.start()]));
        segments.push(Segment::Paragraph(index));
        segments.push(Segment::Separator(separator.as_str().to_string()));
        cursor = separator.end();
    }

    let tail_index = paragraphs.len();
    paragraphs.push(Paragraph::new(tail_index, &text[cursor..]));
    segments.push(Segment::Paragraph(tail_index));

    (segments, paragraphs)
}

/// Stitch the document back together, preferring translated paragraph texts
pub fn reassemble(segments: &[Segment], paragraphs: &[Paragraph], translations: &TranslationResult) -> String {
    let mut output = String::new();
    for segment in segments {
        match segment {
            Segment::Separator(separator) => output.push_str(separator),
            Segment::Paragraph(index) => {
                if let Some(translated) = translations.get(*index) {
                    output.push_str(translated);
                } else if let Some(paragraph) = paragraphs.get(*index) {
                    output.push_str(&paragraph.text);
                }
            }
        }
    }
    output
}
