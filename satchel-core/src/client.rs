use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://drive.satchel.rs";

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

impl DriveError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DriveError::Api {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }
}

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl DriveClient {
    pub fn new(token: impl Into<String>) -> Result<Self, DriveError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, DriveError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: token.into(),
        })
    }

    /// Fetch the metadata record for a single file or folder.
    pub async fn stat(&self, path: &str) -> Result<Resource, DriveError> {
        let mut url = self.endpoint("/v1/drive/resources")?;
        url.query_pairs_mut().append_pair("path", path);
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Existence probe: a 404 from the API folds to `false`, every other
    /// failure stays an error so the caller can surface it.
    pub async fn exists(&self, path: &str) -> Result<bool, DriveError> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn list_directory(
        &self,
        path: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ResourceList, DriveError> {
        let mut url = self.endpoint("/v1/drive/list")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", path);
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = offset {
                query.append_pair("offset", &offset.to_string());
            }
        }
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Resolve a short-lived direct link for fetching the file body.
    pub async fn download_link(&self, path: &str) -> Result<TransferLink, DriveError> {
        let mut url = self.endpoint("/v1/drive/resources/download")?;
        url.query_pairs_mut().append_pair("path", path);
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Blocking variant of [`stat`](Self::stat) for callers that cannot
    /// suspend. Uses a dedicated blocking client per call; do not invoke from
    /// an async context.
    pub fn stat_blocking(&self, path: &str) -> Result<Resource, DriveError> {
        let mut url = self.endpoint("/v1/drive/resources")?;
        url.query_pairs_mut().append_pair("path", path);
        let response = reqwest::blocking::Client::new()
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()?;
        Self::handle_response_blocking(response)
    }

    pub fn exists_blocking(&self, path: &str) -> Result<bool, DriveError> {
        match self.stat_blocking(path) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, DriveError> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DriveError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(DriveError::Api { status, body })
        }
    }

    fn handle_response_blocking<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, DriveError> {
        if response.status().is_success() {
            Ok(response.json::<T>()?)
        } else {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            Err(DriveError::Api { status, body })
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Resource {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    File,
    Dir,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResourceList {
    pub items: Vec<Resource>,
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransferLink {
    pub href: Url,
    pub method: String,
    #[serde(default)]
    pub templated: bool,
}
