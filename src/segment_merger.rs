/*!
 * Sentence level re-segmentation of caption cues.
 *
 * Caption providers deliver short fragments cut by display timing, not by
 * sentence. The merger walks the cues once and glues consecutive fragments
 * together until one ends with terminal punctuation (`.`, `!` or `?`). The
 * last cue always closes whatever is pending, so nothing is dropped.
 */

use serde::{Deserialize, Serialize};
use log::trace;

// @struct: One timed caption fragment as delivered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCue {
    // @field: Caption text, whitespace not normalized
    pub text: String,

    // @field: Offset from the start of the video in seconds
    pub start: f64,

    // @field: Display duration in seconds
    pub duration: f64,
}

impl RawCue {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// One sentence aligned output unit
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSegment {
    /// 1-based position in the output sequence
    pub index: usize,
    /// Whitespace normalized text of all merged cues
    pub text: String,
    /// Start of the first merged cue in seconds
    pub start_seconds: f64,
    /// Sum of the merged cue durations in seconds
    pub duration_seconds: f64,
    /// `MM:SS` rendering of `start_seconds`
    pub start_timestamp: String,
    /// `MM:SS` rendering of `start_seconds + duration_seconds`
    pub end_timestamp: String,
}

impl MergedSegment {
    fn new(index: usize, text: String, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            index,
            start_timestamp: format_time(start_seconds),
            end_timestamp: format_time(start_seconds + duration_seconds),
            text,
            start_seconds,
            duration_seconds,
        }
    }
}

/// Merger state between two cues
#[derive(Debug)]
enum MergeState {
    /// Nothing buffered
    Idle,
    /// A segment is being built
    Accumulating {
        text: String,
        start: f64,
        duration: f64,
    },
}

impl MergeState {
    /// Feed one (already normalized) cue, returning the state after it
    fn push(self, text: &str, start: f64, duration: f64) -> Self {
        match self {
            Self::Idle => Self::Accumulating {
                text: text.to_string(),
                start,
                duration,
            },
            Self::Accumulating {
                text: mut buffer,
                start: buffer_start,
                duration: buffer_duration,
            } => {
                // Blank cues carry duration but do not pin the segment start
                let start = if buffer.is_empty() { start } else { buffer_start };
                if !text.is_empty() {
                    if !buffer.is_empty() {
                        buffer.push(' ');
                    }
                    buffer.push_str(text);
                }
                Self::Accumulating {
                    text: buffer,
                    start,
                    duration: buffer_duration + duration,
                }
            }
        }
    }
}

/// Collapse whitespace runs into single spaces and trim both ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a normalized cue text closes a sentence
pub fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}

/// Merge raw cues into sentence aligned segments.
///
/// Every cue lands in exactly one segment, in order. Durations are summed
/// as given; negative values are not corrected.
pub fn merge(cues: &[RawCue]) -> Vec<MergedSegment> {
    let mut segments = Vec::new();
    let mut state = MergeState::Idle;
    let last = cues.len().saturating_sub(1);

    for (i, cue) in cues.iter().enumerate() {
        let text = normalize_text(&cue.text);
        state = state.push(&text, cue.start, cue.duration);

        if !(ends_sentence(&text) || i == last) {
            continue;
        }

        if let MergeState::Accumulating { text, start, duration } =
            std::mem::replace(&mut state, MergeState::Idle)
        {
            trace!("Closing segment {} at cue {} ({:.2}s + {:.2}s)", segments.len() + 1, i, start, duration);
            segments.push(MergedSegment::new(
                segments.len() + 1,
                text.trim().to_string(),
                start,
                duration,
            ));
        }
    }

    segments
}

/// Render seconds as zero padded `MM:SS`, minutes unbounded.
///
/// Minutes are `floor(s / 60)` and seconds `floor(s mod 60)`, so negative
/// input keeps its sign in the minutes field (`-20.0` renders `-1:40`).
/// Non-finite input renders as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00".to_string();
    }
    let total = seconds.floor() as i64;
    format!("{:02}:{:02}", total.div_euclid(60), total.rem_euclid(60))
}

/// Sum of all segment durations, rendered like a timestamp
pub fn total_duration(segments: &[MergedSegment]) -> String {
    format_time(segments.iter().map(|s| s.duration_seconds).sum())
}
