//! Canonical WebVTT output and WebVTT input
//!
//! The canonical format is the contract with the renderer:
//!
//! ```text
//! WEBVTT
//!
//! HH:MM:SS.mmm --> HH:MM:SS.mmm
//! <text>
//!
//! ```

use crate::cue::{format_timestamp, Cue, CueTrack};
use crate::error::Result;

use super::srt::parse_time_line;

/// Header line of the canonical format
pub const WEBVTT_HEADER: &str = "WEBVTT";

/// Render a cue track in the canonical format
pub fn serialize(track: &CueTrack) -> String {
    let mut output = String::with_capacity(16 + track.len() * 64);
    output.push_str(WEBVTT_HEADER);
    output.push_str("\n\n");

    for cue in track {
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(cue.start),
            format_timestamp(cue.end)
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Parse WebVTT text (including canonical output) into a cue track.
///
/// Header, `NOTE`/`STYLE`/`REGION` blocks and cue identifiers are
/// skipped. Cue settings after the end time are ignored.
pub fn parse_webvtt(content: &str) -> Result<CueTrack> {
    let mut track = CueTrack::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.contains("-->") {
            continue;
        }

        let mut text_lines = Vec::new();
        while let Some(next) = lines.peek() {
            if next.trim().is_empty() {
                break;
            }
            text_lines.push(next.trim_end());
            lines.next();
        }

        match parse_time_line(line).and_then(|(start, end)| Cue::new(start, end, text_lines.join("\n"))) {
            Ok(cue) => track.push(cue),
            Err(e) => tracing::debug!("webvtt: skipping cue: {}", e),
        }
    }

    Ok(track)
}
