//! Timed lyrics
//!
//! Lines look like `[mm:ss.cc] text`. Lines that do not match, blank ones
//! included, are kept as untimed lines at time 0, and the result is stably
//! sorted by time so untimed lines keep their relative order.

use serde::{Deserialize, Serialize};

/// A single lyric line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Seconds from track start
    pub time: f64,
    pub text: String,
}

impl LyricLine {
    /// The line that should be showing at `position` seconds
    pub fn active_at(lines: &[LyricLine], position: f64) -> Option<&LyricLine> {
        lines.iter().take_while(|line| line.time <= position).last()
    }
}

/// Parse timed lyrics into lines ordered by time
pub fn parse_synced_lyrics(text: &str) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = text
        .lines()
        .map(str::trim)
        .map(|line| match parse_timed_line(line) {
            Some((time, text)) => LyricLine {
                time,
                text: text.to_string(),
            },
            None => LyricLine {
                time: 0.0,
                text: line.to_string(),
            },
        })
        .collect();

    // sort_by is stable
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

fn parse_timed_line(line: &str) -> Option<(f64, &str)> {
    let rest = line.strip_prefix('[')?;
    let (stamp, text) = rest.split_once(']')?;
    let time = parse_timestamp(stamp)?;
    Some((time, text.trim()))
}

/// `mm:ss.cc`, with one to three fractional digits
fn parse_timestamp(stamp: &str) -> Option<f64> {
    let (minutes, seconds) = stamp.split_once(':')?;
    let (whole, fraction) = seconds.split_once('.')?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if whole.len() != 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if fraction.is_empty() || fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: f64 = minutes.parse().ok()?;
    let whole: f64 = whole.parse().ok()?;
    let fraction_value: f64 = fraction.parse().ok()?;
    let scale = 10f64.powi(fraction.len() as i32);

    Some(minutes * 60.0 + whole + fraction_value / scale)
}
