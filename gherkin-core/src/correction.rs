//! Free-text correction.
//!
//! The session only needs `correct(text) -> text`. [`DictionaryCorrector`] implements
//! it on top of a Hunspell dictionary: every purely alphabetic word the dictionary does
//! not know is replaced by its first suggestion. Whitespace, punctuation, numbers and
//! `<placeholder>` tags pass through untouched, so correcting a statement never changes
//! the tags extracted from it.

use crate::tags::TAG_REGEX;
use once_cell::sync::Lazy;
use regex::Regex;
use spellbook::Dictionary;
use std::path::{Path, PathBuf};

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w'-]+").unwrap());

pub trait Corrector: Send + Sync {
    fn correct(&self, text: &str) -> String;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Corrector for Passthrough {
    fn correct(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<F> Corrector for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn correct(&self, text: &str) -> String {
        self(text)
    }
}

pub struct DictionaryCorrector {
    dictionary: Dictionary,
}

impl DictionaryCorrector {
    pub fn new(aff: &str, dic: &str) -> Option<Self> {
        match Dictionary::new(aff, dic) {
            Ok(dictionary) => Some(DictionaryCorrector { dictionary }),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to parse dictionary");
                None
            }
        }
    }

    /// Load `<language>.aff` and `<language>.dic` from the first directory holding both.
    pub fn load(language: &str, dirs: &[PathBuf]) -> Option<Self> {
        dirs.iter()
            .find_map(|dir| Self::load_from(dir, language))
    }

    fn load_from(dir: &Path, language: &str) -> Option<Self> {
        let aff_path = dir.join(format!("{language}.aff"));
        let dic_path = dir.join(format!("{language}.dic"));
        if !aff_path.exists() || !dic_path.exists() {
            return None;
        }
        let aff = std::fs::read_to_string(&aff_path).ok()?;
        let dic = std::fs::read_to_string(&dic_path).ok()?;
        tracing::debug!(path = %dic_path.display(), "loading dictionary");
        Self::new(&aff, &dic)
    }

    fn correct_word(&self, word: &str) -> Option<String> {
        if !word.chars().all(|c| c.is_alphabetic() || c == '\'') || self.dictionary.check(word) {
            return None;
        }
        let mut suggestions = Vec::new();
        self.dictionary.suggest(word, &mut suggestions);
        suggestions.into_iter().next()
    }

    fn correct_span(&self, span: &str, out: &mut String) {
        let mut last = 0;
        for m in WORD_REGEX.find_iter(span) {
            out.push_str(&span[last..m.start()]);
            match self.correct_word(m.as_str()) {
                Some(fixed) => out.push_str(&fixed),
                None => out.push_str(m.as_str()),
            }
            last = m.end();
        }
        out.push_str(&span[last..]);
    }
}

impl Corrector for DictionaryCorrector {
    fn correct(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for tag in TAG_REGEX.find_iter(text) {
            self.correct_span(&text[last..tag.start()], &mut out);
            out.push_str(tag.as_str());
            last = tag.end();
        }
        self.correct_span(&text[last..], &mut out);
        out
    }
}

/// Build the corrector described by the spelling settings.
///
/// Falls back to [`Passthrough`] when correction is disabled or no dictionary is found.
pub fn corrector_for(enabled: bool, language: &str, dirs: &[PathBuf]) -> Box<dyn Corrector> {
    if !enabled {
        return Box::new(Passthrough);
    }
    match DictionaryCorrector::load(language, dirs) {
        Some(corrector) => Box::new(corrector),
        None => {
            tracing::warn!(language, ?dirs, "no dictionary found, text correction disabled");
            Box::new(Passthrough)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "SET UTF-8\nTRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'\n";
    const DIC: &str = "6\nthe\nlamp\nis\nlit\nbattery\ncharged\n";

    fn corrector() -> DictionaryCorrector {
        DictionaryCorrector::new(AFF, DIC).unwrap()
    }

    #[test]
    fn test_known_words_untouched() {
        assert_eq!(corrector().correct("the lamp is lit"), "the lamp is lit");
    }

    #[test]
    fn test_misspelled_word_replaced() {
        assert_eq!(corrector().correct("the lmap is lit"), "the lamp is lit");
    }

    #[test]
    fn test_tags_numbers_and_spacing_preserved() {
        let text = "  the <lmap> is  30 lit ";
        assert_eq!(corrector().correct(text), text);
    }

    #[test]
    fn test_passthrough_and_closure() {
        assert_eq!(Passthrough.correct("teh"), "teh");
        let upper = |text: &str| text.to_uppercase();
        assert_eq!(upper.correct("abc"), "ABC");
    }

    #[test]
    fn test_missing_dictionary_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let corrector = corrector_for(true, "xx_XX", &[dir.path().to_path_buf()]);
        assert_eq!(corrector.correct("teh"), "teh");
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en_TEST.aff"), AFF).unwrap();
        std::fs::write(dir.path().join("en_TEST.dic"), DIC).unwrap();
        let missing = dir.path().join("missing");
        let corrector = corrector_for(true, "en_TEST", &[missing, dir.path().to_path_buf()]);
        assert_eq!(corrector.correct("batery"), "battery");
    }
}
