//! Firestore-backed record store over the REST API (v1).

pub mod auth;
pub mod value;

use async_trait::async_trait;
use url::Url;

use self::auth::{FirestoreAuth, ServiceAccountAuth, ServiceAccountKey};
use self::value::{encode_fields, Document, ListDocumentsResponse, WriteDocument};
use super::{RecordStore, StoreError, PROPERTIES_COLLECTION};
use crate::config::Config;
use crate::models::{Fields, Listing};

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;
const MAX_ID_BYTES: usize = 1500;

/// Record store talking to one collection of one Firestore database.
#[derive(Debug)]
pub struct FirestoreStore {
    http: reqwest::Client,
    collection_url: Url,
    auth: FirestoreAuth,
}

impl FirestoreStore {
    /// Creates a store rooted at `base_url` (e.g. [`FIRESTORE_BASE_URL`]).
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project_id: &str,
        auth: FirestoreAuth,
    ) -> Result<Self, StoreError> {
        let mut collection_url = Url::parse(base_url)
            .map_err(|e| StoreError::Decode(format!("invalid Firestore base URL: {}", e)))?;
        collection_url
            .path_segments_mut()
            .map_err(|_| StoreError::Decode("Firestore base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["projects", project_id, "databases", "(default)", "documents"])
            .extend(PROPERTIES_COLLECTION.split('/'));

        Ok(Self {
            http,
            collection_url,
            auth,
        })
    }

    /// Builds the store from configuration: the emulator when
    /// `FIRESTORE_EMULATOR_HOST` is set, otherwise the service-account key file.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if let Some(host) = &config.firestore_emulator_host {
            let project_id = config
                .firestore_project_id
                .clone()
                .unwrap_or_else(|| "demo-listings".to_string());
            tracing::info!("Using Firestore emulator at {} (project {})", host, project_id);
            let base = format!("http://{}/v1", host);
            return Ok(Self::new(http, &base, &project_id, FirestoreAuth::Emulator)?);
        }

        tracing::info!(
            "Loading Firestore credentials from {}",
            config.credentials_path.display()
        );
        let key = ServiceAccountKey::from_file(&config.credentials_path).await?;
        let project_id = config
            .firestore_project_id
            .clone()
            .unwrap_or_else(|| key.project_id.clone());
        let auth = ServiceAccountAuth::new(&key, http.clone())?;

        tracing::info!("Firestore project: {}", project_id);
        Ok(Self::new(
            http,
            FIRESTORE_BASE_URL,
            &project_id,
            FirestoreAuth::ServiceAccount(auth),
        )?)
    }

    fn document_url(&self, id: &str) -> Url {
        let mut url = self.collection_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let token = self.auth.bearer().await?;
        Ok(request.bearer_auth(token).send().await?)
    }
}

/// Whether Firestore could ever have assigned this document id.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_BYTES
        && !id.contains('/')
        && id != "."
        && id != ".."
        && !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}

async fn backend_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    StoreError::Backend { status, message }
}

fn into_listing(doc: Document) -> Result<Listing, StoreError> {
    let id = doc.id().to_string();
    Ok(Listing::new(id, doc.into_fields()?))
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let mut listings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.collection_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &PAGE_SIZE.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.send(self.http.get(url)).await?;
            if !response.status().is_success() {
                return Err(backend_error(response).await);
            }

            let page: ListDocumentsResponse = response.json().await?;
            for doc in page.documents {
                listings.push(into_listing(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Fetched {} listings from Firestore", listings.len());
        Ok(listings)
    }

    async fn insert(&self, fields: Fields) -> Result<Listing, StoreError> {
        let body = WriteDocument {
            fields: encode_fields(&fields),
        };

        let response = self
            .send(self.http.post(self.collection_url.clone()).json(&body))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let doc: Document = response.json().await?;
        tracing::debug!("Created Firestore document {}", doc.name);
        into_listing(doc)
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        if !is_valid_document_id(id) {
            return Ok(None);
        }

        let response = self.send(self.http.get(self.document_url(id))).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let doc: Document = response.json().await?;
        into_listing(doc).map(Some)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self.send(self.http.delete(self.document_url(id))).await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}
