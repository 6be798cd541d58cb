//! Test helpers: build AppState and router over a throwaway local storage root.
//!
//! Run from workspace root: `cargo test -p resizer-api`.

use axum_test::{TestRequest, TestServer};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resizer_api::setup::routes;
use resizer_api::state::AppState;
use resizer_core::{
    Config, OutputKeyScheme, StorageBackend, StorageConfig, TransformConfig,
};
use resizer_storage::Storage;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:4000";
pub const SOURCE_BUCKET: &str = "src-test";
pub const DEST_BUCKET: &str = "dest-test";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Put an object straight into the source bucket.
    pub async fn seed_source(&self, key: &str, data: Vec<u8>) {
        self.state
            .storage
            .source
            .upload_with_key(key, data, "image/png")
            .await
            .expect("Failed to seed source object");
    }

    /// Build a request for an absolute URL issued by the service.
    pub fn request_for_url(&self, method: &str, url: &str) -> TestRequest {
        let path_and_query = url
            .strip_prefix(BASE_URL)
            .unwrap_or_else(|| panic!("URL {} is not served by the test app", url));
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let mut request = match method {
            "GET" => self.server.get(path),
            "PUT" => self.server.put(path),
            other => panic!("unsupported method {}", other),
        };
        if let Some(query) = query {
            for pair in query.split('&') {
                let (name, value) = pair.split_once('=').expect("malformed query pair");
                request = request.add_query_param(name, value);
            }
        }
        request
    }
}

pub fn test_config(storage_path: &str) -> Config {
    Config {
        server_port: 4000,
        environment: "development".to_string(),
        cors_origins: vec!["*".to_string()],
        http_concurrency_limit: 64,
        storage: StorageConfig {
            backend: StorageBackend::Local,
            source_bucket: SOURCE_BUCKET.to_string(),
            dest_bucket: DEST_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            s3_endpoint: None,
            public_base_url: None,
            local_storage_path: storage_path.to_string(),
            local_storage_base_url: BASE_URL.to_string(),
            upload_signing_secret: Some("test-signing-secret-0123456789abcdef".to_string()),
            upload_url_expiry: Duration::from_secs(300),
        },
        transform: TransformConfig {
            max_source_bytes: 5 * 1024 * 1024,
            max_dimension: 3000,
            jpeg_quality: 80,
            output_key_scheme: OutputKeyScheme::SourceKey,
        },
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app with local storage, letting the caller adjust config first.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = test_config(temp_dir.path().to_str().expect("utf-8 temp path"));
    customize(&mut config);
    config.validate().expect("Test config should be valid");

    let storage = resizer_storage::create_storage(&config)
        .await
        .expect("Failed to create local storage");
    let state = Arc::new(AppState::new(config.clone(), storage));

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Opaque PNG of the given size.
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    buf
}

/// Dimensions of a JPEG body.
pub fn jpeg_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .expect("Body should be a JPEG");
    (img.width(), img.height())
}
