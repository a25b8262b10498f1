/*!
 * Mock caption provider for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockCaptionProvider::with_cues()` - Always returns the given cues
 * - `MockCaptionProvider::failing()` - Always fails with an API error
 * - `MockCaptionProvider::disabled()` - Behaves like a video without captions
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::CaptionProvider;
use crate::segment_merger::RawCue;
use crate::video_id::VideoId;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the stored cues
    Cues(Vec<RawCue>),
    /// Always fails with an API error
    Failing,
    /// Reports that the video has no caption tracks
    Disabled,
    /// Simulates a slow provider
    Slow { delay_ms: u64, cues: Vec<RawCue> },
}

/// Mock provider for exercising the service without network access
#[derive(Debug, Clone)]
pub struct MockCaptionProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of fetches served, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockCaptionProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock provider that always returns the given cues
    pub fn with_cues(cues: Vec<RawCue>) -> Self {
        Self::new(MockBehavior::Cues(cues))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock provider for a video without captions
    pub fn disabled() -> Self {
        Self::new(MockBehavior::Disabled)
    }

    /// Number of fetches made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// A short two sentence caption track
    pub fn sample_cues() -> Vec<RawCue> {
        vec![
            RawCue::new("Hello", 0.0, 1.0),
            RawCue::new("world.", 1.0, 1.0),
            RawCue::new("How are", 2.0, 1.0),
            RawCue::new("you?", 3.0, 1.0),
        ]
    }
}

#[async_trait]
impl CaptionProvider for MockCaptionProvider {
    async fn fetch_cues(&self, video_id: &VideoId) -> Result<Vec<RawCue>, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Cues(cues) => Ok(cues.clone()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Disabled => Err(ProviderError::TranscriptsDisabled(video_id.to_string())),

            MockBehavior::Slow { delay_ms, cues } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(cues.clone())
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
