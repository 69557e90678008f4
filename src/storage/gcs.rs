//! Google Cloud Storage backend using the JSON API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use super::store::{ObjectMeta, ObjectStore};
use crate::{error::LakeError, Result};

pub const GCS_BASE_URL: &str = "https://storage.googleapis.com";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
    #[serde(rename = "timeCreated")]
    time_created: Option<DateTime<Utc>>,
}

/// Bucket accessed through `storage.googleapis.com` with an OAuth bearer token.
#[derive(Debug, Clone)]
pub struct GcsStore {
    client: Client,
    base_url: String,
    bucket: String,
    token: String,
}

impl GcsStore {
    pub fn new(client: Client, bucket: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_base_url(client, GCS_BASE_URL, bucket, token)
    }

    /// Point at a different endpoint (emulators and tests).
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let bucket: String = bucket.into();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.trim_start_matches("gs://").trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        h.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))?,
        );
        Ok(h)
    }

    async fn fail(url: &str, response: reqwest::Response) -> LakeError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        LakeError::Status {
            url: url.to_string(),
            status,
            body,
        }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn uri(&self, name: &str) -> String {
        format!("gs://{}/{}", self.bucket, name)
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);
        debug!(object = name, size = bytes.len(), "uploading object");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .query(&[("uploadType", "media"), ("name", name)])
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(&url, response).await);
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(name)
        );
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("alt", "media")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(&url, response).await);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let url = format!("{}/storage/v1/b/{}/o", self.base_url, self.bucket);
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("prefix", prefix.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self
                .client
                .get(&url)
                .headers(self.auth_headers()?)
                .query(&query)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Self::fail(&url, response).await);
            }
            let page: ListResponse = response.json().await?;
            objects.extend(page.items.into_iter().map(|i| ObjectMeta {
                name: i.name,
                created: i.time_created,
            }));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn store(server: &MockServer) -> GcsStore {
        GcsStore::with_base_url(Client::new(), server.uri(), "lake", "tok")
    }

    #[tokio::test]
    async fn test_get_encodes_object_name_as_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/storage/v1/b/lake/o/bronze%2Fsleeper%2Fload_date%3D2025-09-02%2Fdata.parquet",
            ))
            .and(query_param("alt", "media"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7, 8]))
            .mount(&server)
            .await;

        let bytes = store(&server)
            .get("bronze/sleeper/load_date=2025-09-02/data.parquet")
            .await
            .unwrap();
        assert_eq!(bytes, Some(vec![7, 8]));
    }

    #[test]
    fn test_bucket_prefix_is_stripped() {
        let store = GcsStore::new(Client::new(), "gs://my-bucket/", "token");
        assert_eq!(store.bucket(), "my-bucket");
        assert_eq!(store.uri("silver/x.parquet"), "gs://my-bucket/silver/x.parquet");
    }

    #[tokio::test]
    async fn test_list_follows_page_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/lake/o"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "bronze/a/load_date=2025-09-01/data.parquet",
                           "timeCreated": "2025-09-01T08:00:00Z"}]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/lake/o"))
            .and(query_param("prefix", "bronze/a"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "bronze/a/load_date=2025-09-02/data.parquet"}],
                "nextPageToken": "p2"
            })))
            .with_priority(2)
            .mount(&server)
            .await;

        let objects = store(&server).list("bronze/a").await.unwrap();
        let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "bronze/a/load_date=2025-09-01/data.parquet",
                "bronze/a/load_date=2025-09-02/data.parquet"
            ]
        );
        assert!(objects[0].created.is_some());
        assert!(objects[1].created.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_and_put_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/lake/o/missing.parquet"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/lake/o"))
            .and(query_param("name", "silver/x.parquet"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.get("missing.parquet").await.unwrap().is_none());

        let err = store.put("silver/x.parquet", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, LakeError::Status { status: 403, ref body, .. } if body == "denied"));
    }
}
