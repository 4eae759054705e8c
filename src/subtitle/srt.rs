//! SubRip (SRT) parser

use crate::cue::{parse_clock, Cue, CueTrack};
use crate::error::{Result, SubtitleError};

/// Parse SRT text into a cue track.
///
/// Blocks are separated by blank lines. The second line of a block is the
/// time-code line, the rest is cue text. Blocks with fewer than three lines
/// are skipped, as are blocks whose time-code line does not parse.
pub fn parse_srt(content: &str) -> Result<CueTrack> {
    let mut track = CueTrack::new();

    for (block_no, block) in split_blocks(content).into_iter().enumerate() {
        if block.len() < 3 {
            tracing::trace!(block_no, lines = block.len(), "srt: short block skipped");
            continue;
        }

        match parse_block(&block) {
            Ok(cue) => track.push(cue),
            Err(e) => tracing::debug!(block_no, "srt: skipping cue: {}", e),
        }
    }

    Ok(track)
}

/// Split content into blocks of non-blank lines
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(block: &[&str]) -> Result<Cue> {
    let (start, end) = parse_time_line(block[1])?;
    let text = block[2..]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    Cue::new(start, end, text)
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm`, ignoring trailing coordinates
pub(crate) fn parse_time_line(
    line: &str,
) -> Result<(std::time::Duration, std::time::Duration)> {
    let (left, right) = line
        .split_once("-->")
        .ok_or_else(|| SubtitleError::MalformedTimeCode(line.trim().to_string()))?;

    let end_token = right
        .split_whitespace()
        .next()
        .ok_or_else(|| SubtitleError::MalformedTimeCode(line.trim().to_string()))?;

    Ok((parse_clock(left)?, parse_clock(end_token)?))
}
