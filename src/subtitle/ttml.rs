//! TTML / DFXP parser
//!
//! Every `<p>` carrying both `begin` and `end` becomes one cue. Time
//! expressions come in three forms: tick counts (`40000000t`), seconds
//! (`1.5s`) and clock time (`00:00:01.500`).
//!
//! A tick is `1 / tickRate` seconds. The rate comes from the document's
//! `ttp:tickRate` attribute; without one it is [`DEFAULT_TICK_RATE`]
//! (10 MHz, the rate DFXP exports use). Some producers assume 10,000
//! ticks per second instead; such files are not supported and will come
//! out 1000× too short.

use std::time::Duration;

use crate::cue::{parse_clock, Cue, CueTrack};
use crate::error::{Result, SubtitleError};

/// Ticks per second when the document does not declare `ttp:tickRate`
pub const DEFAULT_TICK_RATE: u64 = 10_000_000;

/// Parse a TTML/DFXP document into a cue track.
///
/// Malformed XML fails the whole document. A `<p>` whose time attributes
/// do not parse is skipped.
pub fn parse_ttml(content: &str) -> Result<CueTrack> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(content, options)
        .map_err(|e| SubtitleError::MalformedDocument(format!("XML parse error: {}", e)))?;

    let root = doc.root_element().tag_name().name();
    if root != "tt" {
        return Err(SubtitleError::MalformedDocument(format!(
            "root element is <{}>, not <tt>",
            root
        )));
    }

    let tick_rate = document_tick_rate(&doc);
    let mut track = CueTrack::new();

    for p in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "p")
    {
        let (Some(begin), Some(end)) = (p.attribute("begin"), p.attribute("end")) else {
            continue;
        };

        let cue = parse_ttml_time(begin, tick_rate)
            .and_then(|start| Ok((start, parse_ttml_time(end, tick_rate)?)))
            .and_then(|(start, end)| Cue::new(start, end, paragraph_text(&p)));

        match cue {
            Ok(cue) => track.push(cue),
            Err(e) => tracing::debug!(begin, end, "ttml: skipping paragraph: {}", e),
        }
    }

    Ok(track)
}

fn document_tick_rate(doc: &roxmltree::Document) -> u64 {
    doc.root_element()
        .attributes()
        .find(|a| a.name() == "tickRate")
        .and_then(|a| a.value().trim().parse::<u64>().ok())
        .filter(|rate| *rate > 0)
        .unwrap_or(DEFAULT_TICK_RATE)
}

/// Parse a TTML time expression (ticks, seconds or clock form)
pub fn parse_ttml_time(expr: &str, tick_rate: u64) -> Result<Duration> {
    let s = expr.trim();
    let malformed = || SubtitleError::MalformedTimeCode(s.to_string());

    if let Some(ticks) = s.strip_suffix('t') {
        let ticks: u64 = ticks.parse().map_err(|_| malformed())?;
        let ms = (ticks as u128 * 1000) / tick_rate as u128;
        let ms = u64::try_from(ms).map_err(|_| malformed())?;
        return Ok(Duration::from_millis(ms));
    }

    if let Some(seconds) = s.strip_suffix('s') {
        return parse_decimal_seconds(seconds).ok_or_else(malformed);
    }

    if s.contains(':') {
        return parse_clock(s);
    }

    Err(malformed())
}

/// `12`, `12.5`, `0.040` seconds, truncated to milliseconds
fn parse_decimal_seconds(s: &str) -> Option<Duration> {
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: u64 = whole.parse().ok()?;
    let millis: u64 = format!("{:0<3}", fraction)[..3].parse().ok()?;
    let ms = secs.checked_mul(1000)?.checked_add(millis)?;
    Some(Duration::from_millis(ms))
}

/// Collect paragraph text, turning `<br/>` into newlines
fn paragraph_text(p: &roxmltree::Node) -> String {
    let mut raw = String::new();
    collect_text(p, &mut raw);

    raw.split('\n')
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn collect_text(node: &roxmltree::Node, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            let text = child.text().unwrap_or_default();
            // XML whitespace inside a paragraph collapses to single spaces
            let mut last_space = false;
            for ch in text.chars() {
                if ch.is_whitespace() {
                    if !last_space {
                        out.push(' ');
                    }
                    last_space = true;
                } else {
                    out.push(ch);
                    last_space = false;
                }
            }
        } else if child.is_element() {
            if child.tag_name().name() == "br" {
                out.push('\n');
            } else {
                collect_text(&child, out);
            }
        }
    }
}
