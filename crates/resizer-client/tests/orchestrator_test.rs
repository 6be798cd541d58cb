//! Orchestrator tests against a fake backend.
//!
//! Run with: `cargo test -p resizer-client --test orchestrator_test`

use mockito::{Matcher, Server, ServerGuard};
use resizer_client::{
    ApiClient, ClientConfig, JobObserver, JobState, Orchestrator, OrchestratorError,
    ResizeRequest, SelectedFile,
};

#[derive(Default)]
struct Recorder {
    transitions: Vec<(JobState, u8, String)>,
}

impl JobObserver for Recorder {
    fn on_transition(&mut self, state: JobState, progress: u8, status: &str) {
        self.transitions.push((state, progress, status.to_string()));
    }
}

impl Recorder {
    fn states(&self) -> Vec<JobState> {
        self.transitions.iter().map(|(s, _, _)| *s).collect()
    }

    fn last(&self) -> &(JobState, u8, String) {
        self.transitions.last().expect("no transitions recorded")
    }
}

fn orchestrator(server: &ServerGuard) -> Orchestrator {
    let api = ApiClient::new(&ClientConfig::new(server.url())).unwrap();
    Orchestrator::new(api, 3000)
}

fn request(width: Option<i64>, height: Option<i64>) -> ResizeRequest {
    ResizeRequest {
        file: Some(SelectedFile {
            name: "My Photo.PNG".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: b"raw png bytes".to_vec(),
        }),
        width,
        height,
    }
}

fn upload_url_body(server: &ServerGuard) -> String {
    serde_json::json!({ "uploadUrl": format!("{}/bucket/my-photo.png?sig=abc", server.url()) })
        .to_string()
}

#[tokio::test]
async fn test_happy_path_reaches_ready() {
    let mut server = Server::new_async().await;

    let issue = server
        .mock("GET", "/upload-url")
        .match_query(Matcher::UrlEncoded("key".into(), "my-photo.png".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(upload_url_body(&server))
        .expect(1)
        .create_async()
        .await;
    let upload = server
        .mock("PUT", "/bucket/my-photo.png")
        .match_query(Matcher::UrlEncoded("sig".into(), "abc".into()))
        .match_header("content-type", "image/png")
        .match_body("raw png bytes")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let resize = server
        .mock("GET", "/resize")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "my-photo.png".into()),
            Matcher::UrlEncoded("width".into(), "50".into()),
            Matcher::UrlEncoded("height".into(), "40".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(format!("{}/dest/resized-my-photo.png\n", server.url()))
        .expect(1)
        .create_async()
        .await;
    let fetch = server
        .mock("GET", "/dest/resized-my-photo.png")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(b"jpeg bytes")
        .expect(1)
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let image = orchestrator(&server)
        .run(&request(Some(50), Some(40)), &mut recorder)
        .await
        .unwrap();

    issue.assert_async().await;
    upload.assert_async().await;
    resize.assert_async().await;
    fetch.assert_async().await;

    assert_eq!(image.bytes.as_ref(), b"jpeg bytes");
    assert_eq!(image.content_type, "image/jpeg");
    assert_eq!(image.download_name, "resized-50x40-My Photo.PNG");
    assert_eq!(
        image.source_url,
        format!("{}/dest/resized-my-photo.png", server.url())
    );

    assert_eq!(
        recorder.states(),
        vec![
            JobState::Validating,
            JobState::RequestingUrl,
            JobState::Uploading,
            JobState::Transforming,
            JobState::FetchingResult,
            JobState::Ready,
        ]
    );
    let progress: Vec<u8> = recorder.transitions.iter().map(|(_, p, _)| *p).collect();
    assert_eq!(progress, vec![0, 10, 30, 60, 90, 100]);
}

#[tokio::test]
async fn test_invalid_dimensions_make_no_calls() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    for (width, height) in [
        (Some(3001), Some(10)),
        (Some(10), Some(0)),
        (Some(-5), Some(10)),
        (None, Some(10)),
        (Some(10), None),
    ] {
        let mut recorder = Recorder::default();
        let err = orchestrator(&server)
            .run(&request(width, height), &mut recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::Validation(_)), "{:?}", err);
        assert_eq!(recorder.states(), vec![JobState::Validating, JobState::Errored]);
    }

    any.assert_async().await;
}

#[tokio::test]
async fn test_too_large_message_names_the_limit() {
    let server = Server::new_async().await;
    let mut recorder = Recorder::default();

    let err = orchestrator(&server)
        .run(&request(Some(4000), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Maximum dimension size is 3000px"));
    assert_eq!(recorder.last().2, err.to_string());
}

#[tokio::test]
async fn test_missing_file_is_validation_error() {
    let server = Server::new_async().await;
    let mut recorder = Recorder::default();
    let request = ResizeRequest {
        file: None,
        width: Some(10),
        height: Some(10),
    };

    let err = orchestrator(&server)
        .run(&request, &mut recorder)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OrchestratorError::Validation("Please select a file".to_string())
    );
}

#[tokio::test]
async fn test_issuer_failure_stops_before_upload() {
    let mut server = Server::new_async().await;
    let issue = server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("Failed to issue upload URL")
        .expect(1)
        .create_async()
        .await;
    let upload = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    issue.assert_async().await;
    upload.assert_async().await;
    assert_eq!(
        err.to_string(),
        "Failed to get upload URL: Failed to issue upload URL"
    );
    assert_eq!(recorder.last().0, JobState::Errored);
    assert_eq!(recorder.last().1, 10);
}

#[tokio::test]
async fn test_unreachable_issuer_is_issuance_error() {
    // Nothing listens on port 9 (discard) on a test machine.
    let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let mut recorder = Recorder::default();

    let err = Orchestrator::new(api, 3000)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::Issuance(_)), "{:?}", err);
    assert!(!recorder.states().contains(&JobState::Uploading));
}

#[tokio::test]
async fn test_missing_upload_url_is_issuance_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OrchestratorError::Issuance("No upload URL returned from server".to_string())
    );
}

#[tokio::test]
async fn test_upload_rejected_stops_before_transform() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(upload_url_body(&server))
        .create_async()
        .await;
    server
        .mock("PUT", "/bucket/my-photo.png")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("AccessDenied: Request has expired")
        .create_async()
        .await;
    let resize = server
        .mock("GET", "/resize")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    resize.assert_async().await;
    assert_eq!(
        err,
        OrchestratorError::Upload("AccessDenied: Request has expired".to_string())
    );
    assert_eq!(
        recorder.last(),
        &(
            JobState::Errored,
            30,
            "Upload failed: AccessDenied: Request has expired".to_string()
        )
    );
}

#[tokio::test]
async fn test_missing_source_surfaces_and_skips_fetch() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(upload_url_body(&server))
        .create_async()
        .await;
    server
        .mock("PUT", "/bucket/my-photo.png")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/resize")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("Source object not found: my-photo.png")
        .create_async()
        .await;
    let fetch = server
        .mock("GET", Matcher::Regex("^/dest/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    fetch.assert_async().await;
    assert!(matches!(err, OrchestratorError::Transform(ref msg) if msg.contains("not found")));
    assert_eq!(recorder.last().1, 60);
}

#[tokio::test]
async fn test_fetch_failure_is_fetch_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(upload_url_body(&server))
        .create_async()
        .await;
    server
        .mock("PUT", "/bucket/my-photo.png")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/resize")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!("{}/dest/resized-my-photo.png", server.url()))
        .create_async()
        .await;
    server
        .mock("GET", "/dest/resized-my-photo.png")
        .with_status(403)
        .with_body("AccessDenied")
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&request(Some(10), Some(10)), &mut recorder)
        .await
        .unwrap_err();

    assert_eq!(err, OrchestratorError::Fetch("AccessDenied".to_string()));
    assert_eq!(recorder.last().1, 90);
}

#[tokio::test]
async fn test_missing_content_type_uploads_as_octet_stream() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/upload-url")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(upload_url_body(&server))
        .create_async()
        .await;
    let upload = server
        .mock("PUT", "/bucket/my-photo.png")
        .match_query(Matcher::Any)
        .match_header("content-type", "application/octet-stream")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/resize")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let mut req = request(Some(10), Some(10));
    if let Some(file) = req.file.as_mut() {
        file.content_type = None;
    }

    let mut recorder = Recorder::default();
    let err = orchestrator(&server)
        .run(&req, &mut recorder)
        .await
        .unwrap_err();

    upload.assert_async().await;
    assert_eq!(
        err.to_string(),
        "Resize failed: HTTP 500 Internal Server Error"
    );
}
