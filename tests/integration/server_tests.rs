/*!
 * Integration tests for the HTTP routes
 */

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use captionmerge::app_config::CorsSettings;
use captionmerge::providers::mock::MockCaptionProvider;
use captionmerge::server::build_router;
use crate::common::{self, lecture_cues};

async fn get(app: axum::Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_shouldGreet() {
    let response = get(common::router_with_cues(Vec::new()), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["greeting"], "Hello, World!");
}

#[tokio::test]
async fn test_transcript_withBareId_shouldReturnRawShape() {
    let app = common::router_with_cues(MockCaptionProvider::sample_cues());

    let response = get(app, "/transcript/dQw4w9WgXcQ").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let transcript = body["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["text"], "Hello world.");
    assert_eq!(transcript[0]["start"], 0.0);
    assert_eq!(transcript[0]["duration"], 2.0);
    assert_eq!(transcript[1]["start"], 2.0);
}

#[tokio::test]
async fn test_transcript_withFullUrlsInPath_shouldResolve() {
    let uris = [
        "/transcript/https://youtu.be/dQw4w9WgXcQ",
        "/transcript/https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "/transcript/https%3A%2F%2Fwww.youtube.com%2Fembed%2FdQw4w9WgXcQ",
    ];

    for uri in uris {
        let app = common::router_with_cues(MockCaptionProvider::sample_cues());
        let response = get(app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_transcript_formatted_shouldReturnSegmentsAndMetadata() {
    let app = common::router_with_cues(lecture_cues());

    let response = get(app, "/transcript-formatted/dQw4w9WgXcQ").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let segments = body["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments[0]["id"], 1);
    assert_eq!(segments[0]["content"], "so today we're going to talk about caching.");
    assert_eq!(segments[0]["timestamp"], "00:00");
    assert_eq!(segments[0]["start_seconds"], 0.0);
    assert_eq!(segments[0]["duration"], 4.5);
    assert_eq!(segments[0]["end_timestamp"], "00:04");
    assert_eq!(body["metadata"]["total_segments"], 4);
    assert_eq!(body["metadata"]["total_duration"], "00:12");
}

#[tokio::test]
async fn test_transcript_withInvalidInput_shouldReturnBadRequest() {
    let response = get(common::router_with_cues(lecture_cues()), "/transcript/not%20a%20url").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("not a url"));
}

#[tokio::test]
async fn test_transcript_withProviderFailure_shouldReturnServerError() {
    let app = build_router(common::service_with(MockCaptionProvider::disabled()), &CorsSettings::default());

    let response = get(app, "/transcript-formatted/dQw4w9WgXcQ").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Subtitles are disabled for this video: dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_cors_withDefaultSettings_shouldAllowAnyOriginWithoutCredentials() {
    let app = common::router_with_cues(lecture_cues());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/transcript/dQw4w9WgXcQ")
                .header(header::ORIGIN, "https://somewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn test_cors_preflight_shouldAllowAnyMethodAndHeader() {
    let app = common::router_with_cues(lecture_cues());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/transcript/dQw4w9WgXcQ")
                .header(header::ORIGIN, "https://somewhere.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-custom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
}

#[tokio::test]
async fn test_cors_withExplicitOrigins_shouldOnlyEchoListedOrigin() {
    let settings = CorsSettings {
        allowed_origins: vec!["https://app.example".to_string()],
        allow_credentials: true,
    };
    let service = common::service_with(MockCaptionProvider::with_cues(lecture_cues()));

    let allowed = build_router(service.clone(), &settings)
        .oneshot(
            Request::builder()
                .uri("/transcript/dQw4w9WgXcQ")
                .header(header::ORIGIN, "https://app.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
    assert_eq!(allowed.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let other = build_router(service, &settings)
        .oneshot(
            Request::builder()
                .uri("/transcript/dQw4w9WgXcQ")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(other.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
