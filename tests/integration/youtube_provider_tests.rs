/*!
 * Integration tests for the YouTube caption provider against a fake site
 */

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use captionmerge::errors::ProviderError;
use captionmerge::providers::CaptionProvider;
use captionmerge::providers::youtube::YouTube;
use captionmerge::segment_merger::merge;
use captionmerge::video_id::resolve;
use crate::common::{self, VIDEO_ID};

fn client(server: &MockServer, language: &str) -> YouTube {
    YouTube::new(server.uri(), language, 5, "captionmerge-tests")
}

async fn mount_watch_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", VIDEO_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_cues_withManualTrack_shouldParseTimedtext() {
    let server = MockServer::start().await;
    mount_watch_page(&server, common::watch_page(&server.uri(), &[("en", Some("asr")), ("en", None)])).await;

    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::timedtext(&[
            ("Hello", "0.0", "1.0"),
            ("world&#39;s   best.", "1.0", "1.5"),
            ("How are", "2.5", "1.0"),
            ("you?", "3.5", "1.0"),
        ])))
        .mount(&server)
        .await;

    let id = resolve(VIDEO_ID).unwrap();
    let cues = client(&server, "en").fetch_cues(&id).await.unwrap();

    assert_eq!(cues.len(), 4);
    assert_eq!(cues[1].text, "world's   best.");
    assert_eq!(cues[1].start, 1.0);
    assert_eq!(cues[1].duration, 1.5);

    let segments = merge(&cues);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "Hello world's best.");
    assert_eq!(segments[0].duration_seconds, 2.5);
}

#[tokio::test]
async fn test_fetch_cues_withOnlyOtherLanguages_shouldReportNoTranscript() {
    let server = MockServer::start().await;
    mount_watch_page(&server, common::watch_page(&server.uri(), &[("de", None), ("es", Some("asr"))])).await;

    let id = resolve(VIDEO_ID).unwrap();
    let err = client(&server, "en").fetch_cues(&id).await.unwrap_err();

    match err {
        ProviderError::NoTranscriptFound { available, .. } => assert_eq!(available, "de, es"),
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_cues_withoutCaptions_shouldReportDisabled() {
    let server = MockServer::start().await;
    mount_watch_page(&server, r#"<script>{"playabilityStatus":{"status":"OK"},"videoDetails":{}}</script>"#.to_string()).await;

    let id = resolve(VIDEO_ID).unwrap();
    let err = client(&server, "en").fetch_cues(&id).await.unwrap_err();

    assert!(matches!(err, ProviderError::TranscriptsDisabled(ref video) if video == VIDEO_ID));
}

#[tokio::test]
async fn test_fetch_cues_withRateLimit_shouldReportTooManyRequests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let id = resolve(VIDEO_ID).unwrap();
    let err = client(&server, "en").fetch_cues(&id).await.unwrap_err();

    assert!(matches!(err, ProviderError::TooManyRequests));
}

#[tokio::test]
async fn test_fetch_cues_withServerError_shouldPassStatusThrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let id = resolve(VIDEO_ID).unwrap();
    let err = client(&server, "en").fetch_cues(&id).await.unwrap_err();

    match err {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_cues_withUnreachableHost_shouldReportRequestFailed() {
    let youtube = YouTube::new("http://127.0.0.1:1", "en", 2, "captionmerge-tests");

    let id = resolve(VIDEO_ID).unwrap();
    let err = youtube.fetch_cues(&id).await.unwrap_err();

    assert!(matches!(err, ProviderError::RequestFailed(_)));
}
