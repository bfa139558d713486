use alumni_schema::ListDocumentsResponse;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info};
use url::Url;

use super::{CollectionReader, RemoteDocument};
use crate::config::RemoteConfig;
use crate::error::SyncError;
use crate::utils::logging::{preview, with_pretty_json_debug};

pub const FIRESTORE_USER_AGENT: &str = "alumni-sync/0.1";

const BODY_PREVIEW_CHARS: usize = 512;

/// Lists Firestore collections over the REST API, following page tokens.
#[derive(Clone)]
pub struct FirestoreReader {
    client: reqwest::Client,
    documents_url: Url,
    api_key: Option<String>,
    page_size: u32,
}

impl FirestoreReader {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(FIRESTORE_USER_AGENT)
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(cfg.request_timeout());

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        let client = builder.default_headers(headers).build()?;
        Self::with_client(cfg, client)
    }

    /// Builds a reader around an existing client (shared pools, tests).
    pub fn with_client(cfg: &RemoteConfig, client: reqwest::Client) -> Result<Self, SyncError> {
        if cfg.project_id.trim().is_empty() {
            return Err(SyncError::ConfigError(
                "remote.project_id must be set and non-empty".to_string(),
            ));
        }

        let mut documents_url = cfg.base_url.clone();
        documents_url
            .path_segments_mut()
            .map_err(|()| {
                SyncError::ConfigError(format!("remote.base_url cannot be a base: {}", cfg.base_url))
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                cfg.project_id.as_str(),
                "databases",
                cfg.database.as_str(),
                "documents",
            ]);

        info!(
            documents_url = %documents_url,
            page_size = cfg.page_size,
            api_key = cfg.api_key.is_some(),
            "Firestore reader configured"
        );

        Ok(Self {
            client,
            documents_url,
            api_key: cfg.api_key.clone(),
            page_size: cfg.page_size.max(1),
        })
    }

    fn page_url(&self, collection: &str, page_token: Option<&str>) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(collection);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
            if let Some(key) = self.api_key.as_deref() {
                query.append_pair("key", key);
            }
        }
        url
    }

    async fn fetch_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, SyncError> {
        let url = self.page_url(collection, page_token);
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(text) => preview(&text, BODY_PREVIEW_CHARS),
                Err(e) => format!("<failed to read body: {e}>"),
            };
            return Err(SyncError::RemoteStatus {
                collection: collection.to_string(),
                status,
                body,
            });
        }

        let page = resp.json::<ListDocumentsResponse>().await?;
        with_pretty_json_debug(&page, |json| {
            debug!(collection, "Firestore page:\n{json}");
        });
        Ok(page)
    }
}

#[async_trait]
impl CollectionReader for FirestoreReader {
    async fn get(&self, collection: &str) -> Result<Vec<RemoteDocument>, SyncError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0_usize;

        loop {
            let page = self.fetch_page(collection, page_token.as_deref()).await?;
            pages += 1;

            documents.extend(page.documents.into_iter().map(|doc| {
                let id = doc.id().to_string();
                RemoteDocument::new(id, doc.into_json_fields())
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            collection,
            pages,
            documents = documents.len(),
            "Firestore collection listed"
        );
        Ok(documents)
    }
}
