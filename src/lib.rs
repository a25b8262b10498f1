/*!
 * # captionmerge - sentence level transcripts from video captions
 *
 * A small HTTP service that fetches a video's caption track and re-segments
 * the short, display-timed caption cues into sentence shaped segments with
 * timing metadata.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `video_id`: Resolves video URLs and bare identifiers
 * - `segment_merger`: Merges raw cues into sentence segments
 * - `providers`: Caption provider clients:
 *   - `providers::youtube`: Watch page scraper and timedtext parser
 *   - `providers::mock`: Canned provider for tests
 * - `transcript_service`: Resolve, fetch and merge pipeline plus response payloads
 * - `server`: Routes, CORS and error to status mapping
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod providers;
pub mod segment_merger;
pub mod server;
pub mod transcript_service;
pub mod video_id;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, ResolveError};
pub use segment_merger::{MergedSegment, RawCue, format_time, merge};
pub use transcript_service::TranscriptService;
pub use video_id::{VideoId, resolve};
