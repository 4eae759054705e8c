//! ASS/SSA parser
//!
//! Only the `[Events]` section matters. Its `Format:` line names the
//! columns of every `Dialogue:` line; the Text column swallows the rest of
//! the line because dialogue text may contain commas.

use crate::cue::{parse_clock, Cue, CueTrack};
use crate::error::{Result, SubtitleError};

/// Column positions taken from an `[Events]` `Format:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventFormat {
    start: usize,
    end: usize,
    text: usize,
}

impl EventFormat {
    /// Read a `Format:` value; `None` unless Start, End and Text are all named
    fn parse(columns: &str) -> Option<Self> {
        let mut start = None;
        let mut end = None;
        let mut text = None;

        for (i, name) in columns.split(',').enumerate() {
            match name.trim().to_ascii_lowercase().as_str() {
                "start" => start = Some(i),
                "end" => end = Some(i),
                "text" => text = Some(i),
                _ => {}
            }
        }

        Some(Self {
            start: start?,
            end: end?,
            text: text?,
        })
    }
}

/// Parse ASS/SSA script text into a cue track
pub fn parse_ass(content: &str) -> Result<CueTrack> {
    let mut track = CueTrack::new();
    let mut in_events = false;
    let mut format: Option<EventFormat> = None;

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if line.starts_with('[') && line.ends_with(']') {
            in_events = line.eq_ignore_ascii_case("[events]");
            format = None;
            continue;
        }
        if !in_events {
            continue;
        }

        if let Some(columns) = strip_key(line, "Format") {
            format = EventFormat::parse(columns);
            if format.is_none() {
                tracing::debug!(line_no, "ass: Format line lacks Start/End/Text, ignoring events");
            }
            continue;
        }

        let Some(fields) = strip_key(line, "Dialogue") else {
            continue;
        };
        let Some(format) = format else {
            continue;
        };

        match parse_dialogue(fields, format) {
            Ok(cue) => track.push(cue),
            Err(e) => tracing::debug!(line_no, "ass: skipping dialogue: {}", e),
        }
    }

    Ok(track)
}

/// Strip a `Key:` prefix (case-insensitive key) and return the value
fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (k, v) = line.split_once(':')?;
    k.trim().eq_ignore_ascii_case(key).then_some(v)
}

fn parse_dialogue(fields: &str, format: EventFormat) -> Result<Cue> {
    // Split only up to the Text column; the tail keeps its commas
    let parts: Vec<&str> = fields.splitn(format.text + 1, ',').collect();
    let field = |idx: usize| {
        parts
            .get(idx)
            .copied()
            .ok_or_else(|| SubtitleError::MalformedTimeCode(format!("missing column {}", idx)))
    };

    let start = parse_ass_time(field(format.start)?)?;
    let end = parse_ass_time(field(format.end)?)?;
    let text = clean_ass_text(field(format.text)?);

    Cue::new(start, end, text)
}

/// Parse `H:MM:SS.CC`; centiseconds become milliseconds (× 10)
pub fn parse_ass_time(s: &str) -> Result<std::time::Duration> {
    parse_clock(s.trim())
}

/// Strip `{...}` override tags and translate ASS line-break escapes
pub fn clean_ass_text(text: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for ch in text.chars() {
        if ch == '{' {
            in_tag = true;
        } else if ch == '}' {
            in_tag = false;
        } else if !in_tag {
            result.push(ch);
        }
    }

    result
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}
