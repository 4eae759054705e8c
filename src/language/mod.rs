//! Filename language detection
//!
//! Language is inferred only from filename conventions, never from cue
//! text. An ordered list of token patterns is applied to the file stem;
//! the first token found in the language table wins.

pub mod table;

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

pub use table::{all_codes, canonical_code, language_name, lookup};

/// Where a language token may sit in a filename, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPattern {
    /// `movie.en.srt`
    Dot,
    /// `movie [eng].srt`
    Bracket,
    /// `movie (eng).srt`
    Paren,
    /// `movie_eng.srt`
    Underscore,
    /// `movie-eng.srt`
    Hyphen,
}

impl TokenPattern {
    pub const ORDER: [TokenPattern; 5] = [
        TokenPattern::Dot,
        TokenPattern::Bracket,
        TokenPattern::Paren,
        TokenPattern::Underscore,
        TokenPattern::Hyphen,
    ];

    /// Candidate tokens with the byte range to cut when building a label
    fn tokens<'a>(&self, stem: &'a str) -> Vec<(&'a str, Range<usize>)> {
        match self {
            TokenPattern::Dot => delimited_tokens(stem, '.'),
            TokenPattern::Underscore => delimited_tokens(stem, '_'),
            TokenPattern::Hyphen => delimited_tokens(stem, '-'),
            TokenPattern::Bracket => enclosed_tokens(stem, bracket_regex()),
            TokenPattern::Paren => enclosed_tokens(stem, paren_regex()),
        }
    }
}

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*([A-Za-z]{2,3})\s*\]").expect("valid regex"))
}

fn paren_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*([A-Za-z]{2,3})\s*\)").expect("valid regex"))
}

fn annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("valid regex"))
}

fn is_code_shaped(token: &str) -> bool {
    (2..=3).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Tokens after the first segment, nearest the extension first; the range
/// includes the leading delimiter
fn delimited_tokens(stem: &str, delim: char) -> Vec<(&str, Range<usize>)> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    for (i, segment) in stem.split(delim).enumerate() {
        let start = offset;
        offset += segment.len() + delim.len_utf8();
        if i == 0 || !is_code_shaped(segment) {
            continue;
        }
        tokens.push((segment, start - delim.len_utf8()..start + segment.len()));
    }

    // The tag sits at the end of the name; earlier tokens are title words
    tokens.reverse();
    tokens
}

fn enclosed_tokens<'a>(stem: &'a str, re: &Regex) -> Vec<(&'a str, Range<usize>)> {
    re.captures_iter(stem)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some((token.as_str(), whole.range()))
        })
        .collect()
}

/// Result of detecting a filename's language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguage {
    /// Canonical language code
    pub code: String,
    /// English name of the language
    pub name: String,
    /// Byte range of the matched token in the stem; `None` if defaulted
    pub span: Option<Range<usize>>,
}

/// Detects languages and builds display labels from subtitle filenames
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    default_code: String,
}

impl LanguageDetector {
    pub fn new(default_code: impl Into<String>) -> Self {
        let default_code = default_code.into();
        let default_code = canonical_code(&default_code)
            .map(str::to_string)
            .unwrap_or_else(|| default_code.to_ascii_lowercase());
        Self { default_code }
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// Detect the language code of a subtitle filename
    pub fn detect(&self, filename: &str) -> String {
        self.detect_full(filename).code
    }

    /// Detect language, keeping the token position for label generation
    pub fn detect_full(&self, filename: &str) -> DetectedLanguage {
        let stem = file_stem(filename);

        for pattern in TokenPattern::ORDER {
            for (token, span) in pattern.tokens(stem) {
                if let Some(entry) = lookup(token) {
                    return DetectedLanguage {
                        code: entry.code.to_string(),
                        name: entry.name.to_string(),
                        span: Some(span),
                    };
                }
            }
        }

        DetectedLanguage {
            code: self.default_code.clone(),
            name: language_name(&self.default_code)
                .map(str::to_string)
                .unwrap_or_else(|| self.default_code.to_uppercase()),
            span: None,
        }
    }

    /// Build a display label such as `Movie Name (English)`
    pub fn label(&self, filename: &str) -> String {
        let detected = self.detect_full(filename);
        label_for(file_stem(filename), &detected)
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new("eng")
    }
}

/// File name without directories and without the final extension
fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// Strip the language token and annotations, normalize separators
pub fn label_for(stem: &str, detected: &DetectedLanguage) -> String {
    let mut base = stem.to_string();
    if let Some(span) = &detected.span {
        base.replace_range(span.clone(), " ");
    }

    let base = annotation_regex().replace_all(&base, " ");
    let base = base.replace(['_', '.'], " ");
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

    if base.is_empty() {
        detected.name.clone()
    } else {
        format!("{} ({})", base, detected.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiters() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.detect("movie.fr.srt"), "fre");
        assert_eq!(detector.detect("movie [ger].srt"), "ger");
        assert_eq!(detector.detect("movie (es).ass"), "spa");
        assert_eq!(detector.detect("movie_ita.srt"), "ita");
        assert_eq!(detector.detect("movie-pt.srt"), "por");
    }

    #[test]
    fn test_pattern_order() {
        let detector = LanguageDetector::default();
        // Dot tokens are tried before bracket tokens
        assert_eq!(detector.detect("movie [ger].fr.srt"), "fre");
        // Non-language tokens are passed over
        assert_eq!(detector.detect("movie.sdh.forced.ja.srt"), "jpn");
    }

    #[test]
    fn test_trailing_tag_beats_title_words() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.detect("Love.Is.Blind.S01E01.en.srt"), "eng");
        assert_eq!(detector.detect("The_It_Crowd_fr.srt"), "fre");
        assert_eq!(detector.detect("Love.Is.Blind.en.forced.srt"), "eng");
        assert_eq!(
            detector.label("Love.Is.Blind.S01E01.en.srt"),
            "Love Is Blind S01E01 (English)"
        );
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let detector = LanguageDetector::new("spa");
        assert_eq!(detector.detect("movie.srt"), "spa");
        assert_eq!(detector.detect("movie.xyz.srt"), "spa");
        assert_eq!(detector.detect_full("movie.srt").span, None);
    }

    #[test]
    fn test_default_code_is_canonicalized() {
        assert_eq!(LanguageDetector::new("en").default_code(), "eng");
        assert_eq!(LanguageDetector::new("QQQ").default_code(), "qqq");
    }

    #[test]
    fn test_directory_is_ignored() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.detect("/media/de.films/movie.it.srt"), "ita");
    }

    #[test]
    fn test_labels() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.label("Movie.Name.en.srt"), "Movie Name (English)");
        assert_eq!(detector.label("movie_name [fre] (SDH).srt"), "movie name (French)");
        assert_eq!(detector.label("movie-ger.srt"), "movie (German)");
        assert_eq!(detector.label("en.srt"), "en (English)");
        assert_eq!(detector.label("show.srt"), "show (English)");
    }

    #[test]
    fn test_label_of_bare_token() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.label("[eng].srt"), "English");
    }
}
