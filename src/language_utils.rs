use anyhow::{Result, anyhow};
use isolang::Language;

/// Language and script utilities
///
/// This module validates and normalizes ISO 639 language codes and
/// implements the script checks used to decide whether a text already is in
/// the target language.

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Languages conventionally written in Cyrillic script (ISO 639-1)
const CYRILLIC_LANGUAGES: [&str; 10] = ["ru", "uk", "be", "bg", "sr", "mk", "kk", "ky", "tg", "mn"];

/// Writing system of a target language, as far as the skip heuristic cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Russian, Ukrainian, Bulgarian, ...
    Cyrillic,
}

fn lookup_language(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();
    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = PART2B_TO_PART2T.iter()
                .find(|(b, _)| *b == normalized_code)
                .map(|(_, t)| *t)
                .unwrap_or(normalized_code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Normalize a language code to the ISO 639-1 (2-letter) form the backends expect
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let lang = lookup_language(code)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    lang.to_639_1()
        .map(|c| c.to_string())
        .ok_or_else(|| anyhow!("Language has no ISO 639-1 code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup_language(code)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}

/// Script the target language is written in, if the skip heuristic knows it
pub fn target_script(code: &str) -> Option<Script> {
    let part1 = normalize_to_part1(code).ok()?;
    CYRILLIC_LANGUAGES.contains(&part1.as_str()).then_some(Script::Cyrillic)
}

/// Whether the text contains a basic Cyrillic letter (А-Я, а-я, Ё, ё)
pub fn contains_cyrillic(text: &str) -> bool {
    text.chars().any(|c| matches!(c, 'А'..='я' | 'Ё' | 'ё'))
}

/// Whether the text contains an ASCII Latin letter
pub fn contains_latin(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Whether the text contains a character of the Hebrew block (U+0590..U+05FF)
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

/// Decide whether trimmed input is already in the target script.
///
/// Only text with at least one Cyrillic letter and no Latin or Hebrew
/// characters is skipped; mixed-script text still goes to the backends.
pub fn should_skip_translation(text: &str) -> bool {
    contains_cyrillic(text) && !contains_latin(text) && !contains_hebrew(text)
}

/// Skip heuristic bound to a target language. Targets in other scripts never skip.
pub fn should_skip_for_target(text: &str, target_language: &str) -> bool {
    match target_script(target_language) {
        Some(Script::Cyrillic) => should_skip_translation(text),
        None => false,
    }
}
