//! Canonical cue model
//!
//! Every parser converges on [`CueTrack`]: an ordered list of timed text
//! entries with millisecond resolution. Cues keep the order in which the
//! source listed them; nothing here sorts them.

use std::time::Duration;

use crate::error::{Result, SubtitleError};

/// A single subtitle cue with timing and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl Cue {
    /// Create a cue, rejecting an end time before the start time.
    ///
    /// Both times are truncated to whole milliseconds.
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Result<Self> {
        let start = truncate_to_ms(start);
        let end = truncate_to_ms(end);
        if end < start {
            return Err(SubtitleError::MalformedTimeCode(format!(
                "cue ends before it starts ({} --> {})",
                format_timestamp(start),
                format_timestamp(end)
            )));
        }
        Ok(Self {
            start,
            end,
            text: text.into(),
        })
    }
}

/// Ordered sequence of cues, in parse order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }
}

impl From<Vec<Cue>> for CueTrack {
    fn from(cues: Vec<Cue>) -> Self {
        Self { cues }
    }
}

impl<'a> IntoIterator for &'a CueTrack {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

fn truncate_to_ms(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

/// Format a duration as a canonical `HH:MM:SS.mmm` timestamp
///
/// Hours are zero-padded to two digits and widen past 99.
pub fn format_timestamp(d: Duration) -> String {
    let total_ms = d.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Parse a clock-style time code: `H+:MM:SS` with an optional fraction.
///
/// The fraction may follow a `.` or a `,` and is read as a decimal
/// fraction of a second, so `1.5` is 500 ms and the ASS centisecond form
/// `01.50` is 500 ms as well. Digits beyond milliseconds are truncated.
/// A bare `MM:SS(.fff)` form is accepted too.
pub fn parse_clock(input: &str) -> Result<Duration> {
    let malformed = || SubtitleError::MalformedTimeCode(input.to_string());
    let s = input.trim();

    let (clock, fraction) = match s.find(['.', ',']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, sec] => (parse_digits(h), parse_digits(m), parse_digits(sec)),
        [m, sec] => (Some(0), parse_digits(m), parse_digits(sec)),
        _ => return Err(malformed()),
    };
    let (hours, minutes, seconds) = match (hours, minutes, seconds) {
        (Some(h), Some(m), Some(sec)) if m < 60 && sec < 60 => (h, m, sec),
        _ => return Err(malformed()),
    };

    let millis = match fraction {
        None => 0,
        Some(f) => {
            if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            // Right-pad to three digits, then drop anything finer than 1 ms
            let padded = format!("{:0<3}", f);
            padded[..3].parse::<u64>().map_err(|_| malformed())?
        }
    };

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1000 + millis))
        .map(Duration::from_millis)
        .ok_or_else(malformed)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
