//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access. Unlike a
//! single-bucket client, every operation names its bucket: source documents
//! and thumbnails may live in different buckets.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
    Client,
};
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::types::{BlobStore, ObjectMetadata, StorageObject};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new S3 client from configuration
    ///
    /// Static credentials are used when both keys are configured, otherwise
    /// the default AWS provider chain (environment, profile, instance role).
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "pdf-thumbnailer",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);

        if let Some(endpoint) = &config.endpoint {
            tracing::info!("Using custom S3 endpoint: {}", endpoint);
            // Required for MinIO and other S3-compatible services
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

/// Map an SDK failure onto the storage error taxonomy
fn map_sdk_error<E, R>(action: &str, bucket: &str, key: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    let location = format!("s3://{}/{}", bucket, key);

    match code.as_deref() {
        Some("NoSuchKey") | Some("NotFound") | Some("NoSuchBucket") => {
            StorageError::ObjectNotFound(location)
        }
        Some("AccessDenied") => StorageError::AccessDenied(location),
        _ => StorageError::SdkError(format!(
            "Failed to {} {}: {}",
            action,
            location,
            DisplayErrorContext(&err)
        )),
    }
}

#[async_trait]
impl BlobStore for S3Client {
    async fn download_to(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get object", bucket, key, e))?;

        let mut reader = response.body.into_async_read();
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(dest)
            .await?;

        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        tracing::debug!(bucket, key, bytes = written, "Downloaded object");

        Ok(written)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| map_sdk_error("put object", bucket, key, e))?;

        tracing::debug!(bucket, key, bytes = size, content_type, "Uploaded object");

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StorageObject, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get object", bucket, key, e))?;

        let metadata = ObjectMetadata {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0),
            last_modified: response
                .last_modified()
                .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos())),
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(StorageObject { metadata, data })
    }
}
