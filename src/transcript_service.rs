/*!
 * Transcript service: resolve, fetch and merge.
 *
 * The service is the only piece that knows about all three steps. It owns no
 * mutable state, so one instance is shared by every request.
 */

use std::sync::Arc;
use std::time::Instant;
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::providers::CaptionProvider;
use crate::segment_merger::{self, MergedSegment};
use crate::video_id;

/// One merged segment in the raw `{text, start, duration}` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Body of `GET /transcript/...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: Vec<TranscriptEntry>,
}

/// One merged segment with display timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedSegment {
    pub id: usize,
    pub content: String,
    pub timestamp: String,
    pub start_seconds: f64,
    pub duration: f64,
    pub end_timestamp: String,
}

/// Summary over all formatted segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    pub total_segments: usize,
    pub total_duration: String,
}

/// Body of `GET /transcript-formatted/...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTranscript {
    pub segments: Vec<FormattedSegment>,
    pub metadata: TranscriptMetadata,
}

impl From<&MergedSegment> for TranscriptEntry {
    fn from(segment: &MergedSegment) -> Self {
        Self {
            text: segment.text.clone(),
            start: segment.start_seconds,
            duration: segment.duration_seconds,
        }
    }
}

impl From<&MergedSegment> for FormattedSegment {
    fn from(segment: &MergedSegment) -> Self {
        Self {
            id: segment.index,
            content: segment.text.clone(),
            timestamp: segment.start_timestamp.clone(),
            start_seconds: segment.start_seconds,
            duration: segment.duration_seconds,
            end_timestamp: segment.end_timestamp.clone(),
        }
    }
}

impl From<&[MergedSegment]> for TranscriptResponse {
    fn from(segments: &[MergedSegment]) -> Self {
        Self {
            transcript: segments.iter().map(TranscriptEntry::from).collect(),
        }
    }
}

impl From<&[MergedSegment]> for FormattedTranscript {
    fn from(segments: &[MergedSegment]) -> Self {
        Self {
            segments: segments.iter().map(FormattedSegment::from).collect(),
            metadata: TranscriptMetadata {
                total_segments: segments.len(),
                total_duration: segment_merger::total_duration(segments),
            },
        }
    }
}

/// Stateless resolve → fetch → merge pipeline
#[derive(Debug, Clone)]
pub struct TranscriptService {
    provider: Arc<dyn CaptionProvider>,
}

impl TranscriptService {
    /// Create a service on top of a caption provider
    pub fn new(provider: Arc<dyn CaptionProvider>) -> Self {
        Self { provider }
    }

    /// Resolve `input`, fetch its cues and merge them into sentence segments
    pub async fn segments(&self, input: &str) -> Result<Vec<MergedSegment>, AppError> {
        let start_time = Instant::now();
        let video_id = video_id::resolve(input)?;

        let cues = self.provider.fetch_cues(&video_id).await.map_err(|e| {
            error!("{} provider failed for {}: {}", self.provider.name(), video_id, e);
            e
        })?;

        let segments = segment_merger::merge(&cues);
        info!(
            "Merged {} cues into {} segments for {} in {:?}",
            cues.len(),
            segments.len(),
            video_id,
            start_time.elapsed()
        );

        Ok(segments)
    }

    /// Segments in the raw `{text, start, duration}` shape
    pub async fn transcript(&self, input: &str) -> Result<TranscriptResponse, AppError> {
        let segments = self.segments(input).await?;
        Ok(TranscriptResponse::from(segments.as_slice()))
    }

    /// Segments with display timestamps and summary metadata
    pub async fn formatted(&self, input: &str) -> Result<FormattedTranscript, AppError> {
        let segments = self.segments(input).await?;
        Ok(FormattedTranscript::from(segments.as_slice()))
    }
}
