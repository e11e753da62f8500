use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::info;

use crate::config::StorageConfig;

/// Object storage for sanitized seating schemes.
///
/// Backed by any S3-compatible endpoint (MinIO in the dev stack) when one is
/// configured, or a local directory otherwise.
#[derive(Clone)]
pub struct SchemeStorage {
    store: Arc<dyn ObjectStore>,
    public_url: String,
}

impl SchemeStorage {
    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = match &config.endpoint {
            Some(endpoint) => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region)
                    .with_endpoint(endpoint)
                    .with_virtual_hosted_style_request(false)
                    .with_allow_http(true);

                if let (Some(key), Some(secret)) =
                    (&config.access_key_id, &config.secret_access_key)
                {
                    builder = builder.with_access_key_id(key).with_secret_access_key(secret);
                }

                info!("Scheme storage: s3 bucket {} at {}", config.bucket, endpoint);
                Arc::new(builder.build()?)
            }
            None => {
                std::fs::create_dir_all(&config.bucket)?;
                info!("Scheme storage: local directory {}", config.bucket);
                Arc::new(LocalFileSystem::new_with_prefix(&config.bucket)?)
            }
        };

        Ok(Self {
            store,
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Key convention shared with clients: `cinema_<cinema_id>/hall_<hall_id>.svg`.
    pub fn scheme_key(cinema_id: i64, hall_id: i64) -> String {
        format!("cinema_{cinema_id}/hall_{hall_id}.svg")
    }

    pub async fn put(&self, key: &str, scheme: Vec<u8>) -> Result<(), object_store::Error> {
        let payload = PutPayload::from(Bytes::from(scheme));
        self.store.put(&Path::from(key), payload).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Bytes, object_store::Error> {
        self.store.get(&Path::from(key)).await?.bytes().await
    }

    /// Retrieval URL for a stored key.
    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config(dir: &str) -> StorageConfig {
        StorageConfig {
            bucket: dir.to_string(),
            region: "auto".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_url: "http://localhost:9000/schemes/".to_string(),
        }
    }

    #[test]
    fn scheme_key_convention() {
        assert_eq!(SchemeStorage::scheme_key(7, 42), "cinema_7/hall_42.svg");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let dir = std::env::temp_dir().join("scheme-storage-url-test");
        let storage = SchemeStorage::from_config(&local_config(dir.to_str().unwrap())).unwrap();
        assert_eq!(
            storage.url("cinema_1/hall_2.svg"),
            "http://localhost:9000/schemes/cinema_1/hall_2.svg"
        );
    }

    #[tokio::test]
    async fn put_then_get_round_trips_locally() {
        let dir = std::env::temp_dir().join("scheme-storage-put-test");
        let storage = SchemeStorage::from_config(&local_config(dir.to_str().unwrap())).unwrap();

        let key = SchemeStorage::scheme_key(1, 1);
        storage.put(&key, b"<svg/>".to_vec()).await.unwrap();
        let stored = storage.get(&key).await.unwrap();
        assert_eq!(stored.as_ref(), b"<svg/>");
    }
}
