//! Configuration module
//!
//! Server configuration is read from the environment (after loading a `.env`
//! file when present) and validated once at startup.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DEST_BUCKET, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_SOURCE_BYTES, DEFAULT_REGION,
    DEFAULT_SOURCE_BUCKET, DEFAULT_UPLOAD_URL_EXPIRY_SECS, MAX_DIMENSION,
};
use crate::models::OutputKeyScheme;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 4000;
const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Where the two buckets live and how upload URLs are issued.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub source_bucket: String,
    pub dest_bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub s3_endpoint: Option<String>,
    /// Overrides the destination bucket's public URL base (e.g. a CDN)
    pub public_base_url: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub upload_signing_secret: Option<String>,
    pub upload_url_expiry: Duration,
}

/// Limits and encoding settings for the resize handler.
#[derive(Clone, Debug)]
pub struct TransformConfig {
    pub max_source_bytes: usize,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub output_key_scheme: OutputKeyScheme,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub storage: StorageConfig,
    pub transform: TransformConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let output_key_scheme = match env::var("OUTPUT_KEY_SCHEME") {
            Ok(value) => value.parse::<OutputKeyScheme>()?,
            Err(_) => OutputKeyScheme::default(),
        };

        let storage = StorageConfig {
            backend,
            source_bucket: env::var("SOURCE_BUCKET")
                .unwrap_or_else(|_| DEFAULT_SOURCE_BUCKET.to_string()),
            dest_bucket: env::var("DEST_BUCKET").unwrap_or_else(|_| DEFAULT_DEST_BUCKET.to_string()),
            region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            public_base_url: env::var("PUBLIC_BASE_URL").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            upload_signing_secret: env::var("UPLOAD_SIGNING_SECRET").ok(),
            upload_url_expiry: Duration::from_secs(
                env::var("UPLOAD_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_UPLOAD_URL_EXPIRY_SECS),
            ),
        };

        let transform = TransformConfig {
            max_source_bytes: env::var("MAX_SOURCE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_SOURCE_BYTES),
            max_dimension: env::var("MAX_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_DIMENSION),
            jpeg_quality: env::var("JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JPEG_QUALITY),
            output_key_scheme,
        };

        Ok(Config {
            server_port,
            environment,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(10_000)
                .max(1),
            storage,
            transform,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Fail fast on misconfiguration.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.allows_any_origin() {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.storage.source_bucket.trim().is_empty() || self.storage.dest_bucket.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "SOURCE_BUCKET and DEST_BUCKET must not be empty"
            ));
        }

        if self.storage.source_bucket == self.storage.dest_bucket {
            return Err(anyhow::anyhow!(
                "SOURCE_BUCKET and DEST_BUCKET must differ"
            ));
        }

        if self.storage.backend == StorageBackend::Local {
            match self.storage.upload_signing_secret.as_deref() {
                Some(secret) if secret.len() >= MIN_SIGNING_SECRET_LEN => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "UPLOAD_SIGNING_SECRET must be at least {} characters for the local storage backend",
                        MIN_SIGNING_SECRET_LEN
                    ))
                }
            }
        }

        if self.storage.upload_url_expiry.is_zero() {
            return Err(anyhow::anyhow!("UPLOAD_URL_EXPIRY_SECS must be positive"));
        }

        if self.transform.max_source_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_SOURCE_BYTES must be positive"));
        }

        if self.transform.max_dimension == 0 {
            return Err(anyhow::anyhow!("MAX_DIMENSION must be positive"));
        }

        if !(1..=100).contains(&self.transform.jpeg_quality) {
            return Err(anyhow::anyhow!(
                "JPEG_QUALITY must be between 1 and 100, got {}",
                self.transform.jpeg_quality
            ));
        }

        Ok(())
    }
}
