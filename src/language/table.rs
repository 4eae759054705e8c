//! Language code table
//!
//! Each entry carries the canonical ISO 639-2/B code, the ISO 639-1 code
//! and, where it differs, the ISO 639-2/T code. Detection returns the
//! canonical code whichever alias matched.

/// One row of the language table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Canonical code (ISO 639-2/B)
    pub code: &'static str,
    /// ISO 639-1
    pub alpha2: &'static str,
    /// ISO 639-2/T when different from the /B code
    pub terminology: Option<&'static str>,
    /// English name, used in labels
    pub name: &'static str,
}

const fn lang(
    code: &'static str,
    alpha2: &'static str,
    terminology: Option<&'static str>,
    name: &'static str,
) -> LanguageEntry {
    LanguageEntry {
        code,
        alpha2,
        terminology,
        name,
    }
}

pub static LANGUAGES: &[LanguageEntry] = &[
    lang("eng", "en", None, "English"),
    lang("fre", "fr", Some("fra"), "French"),
    lang("spa", "es", None, "Spanish"),
    lang("ger", "de", Some("deu"), "German"),
    lang("ita", "it", None, "Italian"),
    lang("por", "pt", None, "Portuguese"),
    lang("dut", "nl", Some("nld"), "Dutch"),
    lang("pol", "pl", None, "Polish"),
    lang("rus", "ru", None, "Russian"),
    lang("ukr", "uk", None, "Ukrainian"),
    lang("swe", "sv", None, "Swedish"),
    lang("fin", "fi", None, "Finnish"),
    lang("dan", "da", None, "Danish"),
    lang("nor", "no", None, "Norwegian"),
    lang("ice", "is", Some("isl"), "Icelandic"),
    lang("cze", "cs", Some("ces"), "Czech"),
    lang("slo", "sk", Some("slk"), "Slovak"),
    lang("slv", "sl", None, "Slovenian"),
    lang("hun", "hu", None, "Hungarian"),
    lang("rum", "ro", Some("ron"), "Romanian"),
    lang("bul", "bg", None, "Bulgarian"),
    lang("hrv", "hr", None, "Croatian"),
    lang("srp", "sr", None, "Serbian"),
    lang("gre", "el", Some("ell"), "Greek"),
    lang("tur", "tr", None, "Turkish"),
    lang("est", "et", None, "Estonian"),
    lang("lav", "lv", None, "Latvian"),
    lang("lit", "lt", None, "Lithuanian"),
    lang("heb", "he", None, "Hebrew"),
    lang("ara", "ar", None, "Arabic"),
    lang("per", "fa", Some("fas"), "Persian"),
    lang("hin", "hi", None, "Hindi"),
    lang("ben", "bn", None, "Bengali"),
    lang("tam", "ta", None, "Tamil"),
    lang("tel", "te", None, "Telugu"),
    lang("urd", "ur", None, "Urdu"),
    lang("tha", "th", None, "Thai"),
    lang("vie", "vi", None, "Vietnamese"),
    lang("ind", "id", None, "Indonesian"),
    lang("may", "ms", Some("msa"), "Malay"),
    lang("chi", "zh", Some("zho"), "Chinese"),
    lang("jpn", "ja", None, "Japanese"),
    lang("kor", "ko", None, "Korean"),
    lang("cat", "ca", None, "Catalan"),
    lang("baq", "eu", Some("eus"), "Basque"),
    lang("glg", "gl", None, "Galician"),
];

/// Look up a code of any supported form (case-insensitive)
pub fn lookup(token: &str) -> Option<&'static LanguageEntry> {
    let token = token.to_ascii_lowercase();
    LANGUAGES.iter().find(|entry| {
        entry.code == token || entry.alpha2 == token || entry.terminology == Some(token.as_str())
    })
}

/// Canonical code for any alias, e.g. `en` -> `eng`
pub fn canonical_code(token: &str) -> Option<&'static str> {
    lookup(token).map(|entry| entry.code)
}

/// English name for any alias
pub fn language_name(token: &str) -> Option<&'static str> {
    lookup(token).map(|entry| entry.name)
}

/// Every alias in the table (canonical, ISO 639-1, ISO 639-2/T)
pub fn all_codes() -> impl Iterator<Item = &'static str> {
    LANGUAGES.iter().flat_map(|entry| {
        [Some(entry.code), Some(entry.alpha2), entry.terminology]
            .into_iter()
            .flatten()
    })
}
