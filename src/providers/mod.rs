/*!
 * Caption provider implementations.
 *
 * This module contains the clients that turn a video identifier into the
 * raw, timed caption cues the segment merger works on:
 * - YouTube: scrapes the watch page for caption tracks and downloads the
 *   timedtext XML of the selected track
 * - Mock: canned cues or errors for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::segment_merger::RawCue;
use crate::video_id::VideoId;

/// Common trait for all caption providers
///
/// Implementations must be shareable across concurrent requests; the
/// service holds a single instance behind an `Arc`.
#[async_trait]
pub trait CaptionProvider: Send + Sync + Debug {
    /// Fetch the ordered raw cues for a video
    ///
    /// # Arguments
    /// * `video_id` - The resolved video identifier
    ///
    /// # Returns
    /// * `Result<Vec<RawCue>, ProviderError>` - Cues in non-decreasing start order, or an error
    async fn fetch_cues(&self, video_id: &VideoId) -> Result<Vec<RawCue>, ProviderError>;

    /// Short provider name used in log lines
    fn name(&self) -> &'static str;
}

pub mod youtube;
pub mod mock;
