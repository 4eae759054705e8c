//! Subtitle conversion module
//!
//! This module turns subtitle files into the canonical WebVTT form:
//! - Format detection by extension ([`FormatKind`])
//! - SRT, ASS/SSA, TTML/DFXP and WebVTT parsers
//! - Canonical serialization

pub mod ass;
pub mod format;
pub mod srt;
pub mod ttml;
pub mod webvtt;

pub use format::FormatKind;
pub use webvtt::{serialize, WEBVTT_HEADER};

use crate::cue::CueTrack;
use crate::error::Result;

/// Parse subtitle text of a known format into a cue track
pub fn parse(content: &str, kind: FormatKind) -> Result<CueTrack> {
    match kind {
        FormatKind::Srt => srt::parse_srt(content),
        FormatKind::Ass => ass::parse_ass(content),
        FormatKind::Ttml => ttml::parse_ttml(content),
        FormatKind::WebVtt => webvtt::parse_webvtt(content),
    }
}

/// Decode raw file bytes: lossy UTF-8, BOM stripped, LF line endings
pub fn decode_text(bytes: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded
        .strip_prefix('\u{feff}')
        .unwrap_or(decoded.as_ref());
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode, parse and serialize a subtitle file's bytes in one step
pub fn convert_bytes(bytes: &[u8], kind: FormatKind) -> Result<(CueTrack, String)> {
    let track = parse(&decode_text(bytes), kind)?;
    let canonical = serialize(&track);
    Ok((track, canonical))
}
