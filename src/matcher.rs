//! Subtitle matcher
//!
//! Associates subtitle files found next to a media file with that media
//! file using filename heuristics only:
//! - exact match against synthetic names (`movie.en`, `movie_forced`, ...)
//! - fuzzy containment of the normalized names in either direction
//!
//! Matches are ordered by a pluggable [`RankingPolicy`].

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::language::{all_codes, canonical_code, LanguageDetector};
use crate::subtitle::FormatKind;
use crate::types::SubtitleSource;

/// Separators used to build expected-name variants
pub const VARIANT_DELIMITERS: [char; 4] = ['.', '_', '-', ' '];

/// Default qualifier tokens that may follow the media name
pub const DEFAULT_QUALIFIERS: [&str; 3] = ["forced", "default", "sub"];

/// Orders matched subtitles; lower rank sorts first
pub trait RankingPolicy: Send + Sync + fmt::Debug {
    fn rank(&self, source: &SubtitleSource) -> usize;
}

/// Ranks by position of the track's language in a preference list
#[derive(Debug, Clone, Default)]
pub struct LanguagePriority {
    languages: Vec<String>,
}

impl LanguagePriority {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages = languages
            .into_iter()
            .map(|l| normalize_language(l.as_ref()))
            .collect();
        Self { languages }
    }
}

impl RankingPolicy for LanguagePriority {
    fn rank(&self, source: &SubtitleSource) -> usize {
        self.languages
            .iter()
            .position(|l| *l == source.language_code)
            .unwrap_or(self.languages.len())
    }
}

/// Canonical code for known languages, lowercase otherwise
pub fn normalize_language(code: &str) -> String {
    canonical_code(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.trim().to_ascii_lowercase())
}

/// Lowercase and keep only letters and digits
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// How a candidate was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Stem equals an expected-name variant
    Exact,
    /// Normalized names contain one another
    Fuzzy,
}

/// Matches and ranks subtitle candidates for a media file
#[derive(Debug, Clone)]
pub struct SubtitleMatcher {
    detector: LanguageDetector,
    qualifiers: Vec<String>,
    ranking: Arc<dyn RankingPolicy>,
}

impl SubtitleMatcher {
    pub fn new(
        detector: LanguageDetector,
        qualifiers: Vec<String>,
        ranking: Arc<dyn RankingPolicy>,
    ) -> Self {
        Self {
            detector,
            qualifiers: qualifiers.into_iter().map(|q| q.to_lowercase()).collect(),
            ranking,
        }
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    /// Expected subtitle stems for a media base name, lowercase
    pub fn expected_names(&self, media_base: &str) -> HashSet<String> {
        let base = media_base.to_lowercase();
        let mut names = HashSet::new();
        names.insert(base.clone());

        for d in VARIANT_DELIMITERS {
            for q in &self.qualifiers {
                names.insert(format!("{base}{d}{q}"));
            }
            for code in all_codes() {
                names.insert(format!("{base}{d}{code}"));
                for q in &self.qualifiers {
                    names.insert(format!("{base}{d}{code}{d}{q}"));
                }
            }
        }
        for code in all_codes() {
            for sep in ["", " "] {
                names.insert(format!("{base}{sep}[{code}]"));
                names.insert(format!("{base}{sep}({code})"));
            }
        }

        names
    }

    /// Decide whether a candidate stem belongs to the media base name
    pub fn classify(
        &self,
        media_base: &str,
        expected: &HashSet<String>,
        candidate_stem: &str,
    ) -> Option<MatchKind> {
        if expected.contains(&candidate_stem.to_lowercase()) {
            return Some(MatchKind::Exact);
        }

        let media = normalize_name(media_base);
        let candidate = normalize_name(candidate_stem);
        if media.is_empty() || candidate.is_empty() {
            return None;
        }
        if media.contains(&candidate) || candidate.contains(&media) {
            return Some(MatchKind::Fuzzy);
        }
        None
    }

    /// Filter candidate paths down to the subtitles of `media_path`, ranked.
    ///
    /// Candidates without a supported subtitle extension are ignored. An
    /// empty result is a normal outcome.
    pub fn match_candidates(&self, media_path: &str, candidates: &[String]) -> Vec<SubtitleSource> {
        let Some(media_base) = Path::new(media_path).file_stem().and_then(|s| s.to_str()) else {
            return Vec::new();
        };
        let expected = self.expected_names(media_base);

        let mut matched: Vec<SubtitleSource> = candidates
            .iter()
            .filter(|c| c.as_str() != media_path && FormatKind::is_subtitle_path(c))
            .filter_map(|c| {
                let stem = Path::new(c).file_stem().and_then(|s| s.to_str())?;
                let kind = self.classify(media_base, &expected, stem)?;
                let source = SubtitleSource::from_path(c, &self.detector).ok()?;
                tracing::debug!(
                    candidate = c.as_str(),
                    ?kind,
                    language = source.language_code.as_str(),
                    "subtitle matched"
                );
                Some(source)
            })
            .collect();

        // Stable: equal ranks keep directory scan order
        matched.sort_by_key(|s| self.ranking.rank(s));
        matched
    }
}

impl Default for SubtitleMatcher {
    fn default() -> Self {
        Self::new(
            LanguageDetector::default(),
            DEFAULT_QUALIFIERS.iter().map(|q| q.to_string()).collect(),
            Arc::new(LanguagePriority::new(["eng"])),
        )
    }
}
