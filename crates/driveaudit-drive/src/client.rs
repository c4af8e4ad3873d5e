//! HTTP implementation of [`DriveApi`] against the Drive v3 REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{
    DriveApi, FileListRequest, Page, PermissionListRequest, RemoteFile, RemotePermission,
};
use crate::auth::TokenSource;

pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

pub struct GoogleDriveApi {
    client: Client,
    base_url: String,
    auth: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RemoteFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionListResponse {
    #[serde(default)]
    permissions: Vec<RemotePermission>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GoogleDriveApi {
    pub fn new(auth: Arc<dyn TokenSource>) -> Result<Self> {
        Self::with_base_url(DRIVE_BASE_URL.to_string(), auth)
    }

    pub fn with_base_url(base_url: String, auth: Arc<dyn TokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let token = self.auth.access_token().await?;
        let url = self.build_url(path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match serde_json::from_str::<GoogleErrorEnvelope>(&error_text) {
                Ok(envelope) => format!("{} {}", envelope.error.code, envelope.error.message),
                Err(_) => error_text,
            };
            return Err(anyhow::anyhow!(
                "Drive API request failed with status {}: {}",
                status,
                message
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }
}

fn file_list_query(request: &FileListRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("corpora", request.corpora.clone()),
        ("pageSize", request.page_size.to_string()),
        ("fields", request.fields.clone()),
    ];
    if request.supports_all_drives {
        query.push(("supportsAllDrives", "true".to_string()));
    }
    if request.include_items_from_all_drives {
        query.push(("includeItemsFromAllDrives", "true".to_string()));
    }
    if let Some(token) = &request.page_token {
        query.push(("pageToken", token.clone()));
    }
    query
}

fn permission_list_query(request: &PermissionListRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![("fields", request.fields.clone())];
    if request.supports_all_drives {
        query.push(("supportsAllDrives", "true".to_string()));
    }
    if let Some(token) = &request.page_token {
        query.push(("pageToken", token.clone()));
    }
    query
}

#[async_trait]
impl DriveApi for GoogleDriveApi {
    async fn list_files(&self, request: &FileListRequest) -> Result<Page<RemoteFile>> {
        let body: FileListResponse = self.get("/files", &file_list_query(request)).await?;
        Ok(Page::new(body.files, body.next_page_token))
    }

    async fn list_permissions(
        &self,
        file_id: &str,
        request: &PermissionListRequest,
    ) -> Result<Page<RemotePermission>> {
        let path = format!("/files/{}/permissions", urlencoding::encode(file_id));
        let body: PermissionListResponse = self.get(&path, &permission_list_query(request)).await?;
        Ok(Page::new(body.permissions, body.next_page_token))
    }
}
