use std::time::Duration;
use serde::Deserialize;
use reqwest::{Client, header};
use regex::Regex;
use once_cell::sync::Lazy;
use url::Url;
use log::{debug, error};
use xml::reader::{EventReader, XmlEvent};
use async_trait::async_trait;

use crate::app_config::CaptionsConfig;
use crate::errors::ProviderError;
use crate::providers::CaptionProvider;
use crate::segment_merger::RawCue;
use crate::video_id::VideoId;

// @const: Inline formatting tags YouTube leaves inside cue text
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// @const: Numeric character references (`&#39;`, `&#x27;`)
static NUMERIC_ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").unwrap()
});

/// YouTube client that scrapes caption tracks off the watch page
pub struct YouTube {
    /// HTTP client for page and track requests
    client: Client,
    /// Base URL, `https://www.youtube.com` unless overridden
    endpoint: String,
    /// Preferred caption language code
    language: String,
}

impl std::fmt::Debug for YouTube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTube")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .finish()
    }
}

/// `captions` object embedded in the watch page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionsJson {
    /// Renderer holding the available tracks
    pub player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

/// Caption track list of a video
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracklistRenderer {
    /// Available tracks, manual and auto-generated
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

/// A single caption track
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// URL of the timedtext document
    pub base_url: String,
    /// Language code, e.g. `en`
    pub language_code: String,
    /// `asr` for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    /// Whether the track was generated by speech recognition
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

impl YouTube {
    /// Create a new YouTube client
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>, timeout_secs: u64, user_agent: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent(user_agent)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            language: language.into(),
        }
    }

    /// Create a client from the captions section of the configuration
    pub fn from_config(config: &CaptionsConfig) -> Self {
        Self::new(&config.endpoint, &config.language, config.timeout_secs, &config.user_agent)
    }

    fn watch_url(&self, video_id: &VideoId) -> Result<Url, ProviderError> {
        let base = format!("{}/watch", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(&base, &[("v", video_id.as_str())])
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", self.endpoint, e)))
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.client.get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to reach captions provider: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::TooManyRequests);
        }
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Captions provider error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.text().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to read response body: {}", e)))
    }

    /// Pull the caption tracks out of a watch page
    pub fn extract_caption_tracks(html: &str, video_id: &VideoId) -> Result<Vec<CaptionTrack>, ProviderError> {
        let Some(captions) = html.split_once("\"captions\":").map(|(_, rest)| rest) else {
            if html.contains("class=\"g-recaptcha\"") {
                return Err(ProviderError::TooManyRequests);
            }
            if !html.contains("\"playabilityStatus\":") {
                return Err(ProviderError::VideoUnavailable(video_id.to_string()));
            }
            return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
        };

        let captions = captions
            .split_once(",\"videoDetails")
            .map_or(captions, |(json, _)| json)
            .replace('\n', "");

        let parsed: CaptionsJson = serde_json::from_str(&captions)
            .map_err(|e| ProviderError::ParseError(format!("Invalid captions JSON: {}", e)))?;

        let tracks = parsed.player_captions_tracklist_renderer
            .map(|renderer| renderer.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
        }

        Ok(tracks)
    }

    /// Pick the track for `language`, preferring manually created ones
    pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str, video_id: &VideoId) -> Result<&'a CaptionTrack, ProviderError> {
        let matches = |t: &&CaptionTrack| t.language_code.eq_ignore_ascii_case(language);

        tracks.iter()
            .filter(matches)
            .find(|t| !t.is_generated())
            .or_else(|| tracks.iter().find(matches))
            .ok_or_else(|| ProviderError::NoTranscriptFound {
                video_id: video_id.to_string(),
                language: language.to_string(),
                available: tracks.iter()
                    .map(|t| t.language_code.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Parse a timedtext XML document into cues
    ///
    /// Elements without text are skipped; a missing `dur` attribute counts as zero.
    pub fn parse_timedtext(xml_doc: &str) -> Result<Vec<RawCue>, ProviderError> {
        let mut cues = Vec::new();
        let mut current: Option<(f64, f64, String)> = None;

        for event in EventReader::new(xml_doc.as_bytes()) {
            let event = event.map_err(|e| ProviderError::ParseError(format!("Invalid timedtext XML: {}", e)))?;
            match event {
                XmlEvent::StartElement { name, attributes, .. } if name.local_name == "text" => {
                    let attr = |key: &str| -> Option<String> {
                        attributes.iter()
                            .find(|a| a.name.local_name == key)
                            .map(|a| a.value.clone())
                    };
                    let start = attr("start")
                        .ok_or_else(|| ProviderError::ParseError("Cue without start attribute".to_string()))?
                        .parse::<f64>()
                        .map_err(|e| ProviderError::ParseError(format!("Invalid cue start: {}", e)))?;
                    let duration = match attr("dur").as_deref() {
                        Some(dur) => dur.parse::<f64>()
                            .map_err(|e| ProviderError::ParseError(format!("Invalid cue duration: {}", e)))?,
                        None => 0.0,
                    };
                    current = Some((start, duration, String::new()));
                }
                XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text) => {
                    if let Some((_, _, buffer)) = current.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                XmlEvent::EndElement { name } if name.local_name == "text" => {
                    if let Some((start, duration, raw)) = current.take() {
                        let text = clean_cue_text(&raw);
                        if !text.trim().is_empty() {
                            cues.push(RawCue { text, start, duration });
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(cues)
    }
}

/// Undo the HTML escaping YouTube applies on top of XML, then drop inline tags
fn clean_cue_text(raw: &str) -> String {
    let unescaped = NUMERIC_ENTITY_REGEX.replace_all(raw, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    let unescaped = unescaped
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    TAG_REGEX.replace_all(&unescaped, "").into_owned()
}

#[async_trait]
impl CaptionProvider for YouTube {
    async fn fetch_cues(&self, video_id: &VideoId) -> Result<Vec<RawCue>, ProviderError> {
        let watch_url = self.watch_url(video_id)?;
        debug!("Fetching watch page {}", watch_url);
        let html = self.get_text(watch_url.as_str()).await?;

        let tracks = Self::extract_caption_tracks(&html, video_id)?;
        let track = Self::select_track(&tracks, &self.language, video_id)?;
        debug!(
            "Using {} caption track '{}' for {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code,
            video_id
        );

        let track_url = track.base_url.replace("&fmt=srv3", "");
        let xml_doc = self.get_text(&track_url).await?;
        let cues = Self::parse_timedtext(&xml_doc)?;
        debug!("Parsed {} cues for {}", cues.len(), video_id);

        Ok(cues)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
