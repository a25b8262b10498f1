use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;
use serde::Serialize;

use crate::errors::ResolveError;

// @module: Video identifier resolution

/// Length of a canonical YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

// @const: Known URL shapes, in match priority order
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"youtube\.com/watch\?v=([^"&?/\s]{11})"#,
        r#"youtu\.be/([^"&?/\s]{11})"#,
        r#"youtube\.com/embed/([^"&?/\s]{11})"#,
        r#"youtube\.com/verify_age\?next_url=/watch%3Fv%3D([^"&?/\s]{11})"#,
        r#"youtube\.com/verify_age\?next_url=/watch\?v=([^"&?/\s]{11})"#,
        r#"youtube\.com/shorts/([^"&?/\s]{11})"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Canonical 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for VideoId {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

/// Resolve a user supplied URL or bare identifier into a canonical video id.
///
/// Known URL shapes are tried first, in order; the first one that matches
/// wins. Anything else that is exactly 11 characters long is taken as an
/// already bare identifier.
pub fn resolve(input: &str) -> Result<VideoId, ResolveError> {
    for pattern in URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|caps| caps.get(1)) {
            debug!("Resolved '{}' to video id {}", input, id.as_str());
            return Ok(VideoId(id.as_str().to_string()));
        }
    }

    if input.chars().count() == VIDEO_ID_LEN {
        return Ok(VideoId(input.to_string()));
    }

    Err(ResolveError::InvalidInput(input.to_string()))
}
