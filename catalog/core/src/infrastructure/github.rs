// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! GitHub Contents API adapter
//!
//! Implements [`RemoteFileStore`] against the repository contents endpoint.
//!
//! # API Endpoints
//!
//! - `GET /repos/{owner}/{repo}/contents/{path}` - file body (base64) and blob sha
//! - `PUT /repos/{owner}/{repo}/contents/{path}` - commit new content, guarded by `sha`
//!
//! The blob sha is used as the version tag. A PUT carrying a stale sha is
//! rejected by the API, which surfaces here as [`StoreError::VersionConflict`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::config::{RemoteConfig, SecretToken};
use crate::domain::store::{RemoteFile, RemoteFileStore, StoreError, VersionTag};
use crate::infrastructure::content_codec::{decode_content, encode_content};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("agent-hub/", env!("CARGO_PKG_VERSION"));

/// Contents API adapter for the catalog data file
pub struct GitHubContentsStore {
    client: Client,
    contents_url: String,
    branch: Option<String>,
    token: Option<SecretToken>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    content: CommittedContent,
}

#[derive(Debug, Deserialize)]
struct CommittedContent {
    sha: String,
}

impl GitHubContentsStore {
    /// Create adapter from the remote section of the configuration
    ///
    /// # Arguments
    /// * `config` - Repository coordinates, timeout and optional write token
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let contents_url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.api_base.trim_end_matches('/'),
            config.owner,
            config.repo,
            config.path.trim_start_matches('/')
        );

        Ok(Self {
            client,
            contents_url,
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    pub fn contents_url(&self) -> &str {
        &self.contents_url
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        match &self.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("token {}", token.expose()))
                    .map_err(|_| {
                        StoreError::WritePermissionDenied(
                            "token contains characters not allowed in a header".to_string(),
                        )
                    })?;
                value.set_sensitive(true);
                Ok(request.header(AUTHORIZATION, value))
            }
            None => Ok(request),
        }
    }
}

#[async_trait]
impl RemoteFileStore for GitHubContentsStore {
    async fn fetch_file(&self) -> Result<RemoteFile, StoreError> {
        let mut request = self.client.get(&self.contents_url);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }
        let response = self.authorized(request)?.send().await?;

        match response.status() {
            status if status.is_success() => {
                let body: ContentsResponse = response.json().await.map_err(|e| {
                    StoreError::Encoding(format!("unexpected contents response: {}", e))
                })?;

                if let Some(encoding) = body.encoding.as_deref() {
                    if encoding != "base64" {
                        return Err(StoreError::Encoding(format!(
                            "unsupported content encoding '{}'",
                            encoding
                        )));
                    }
                }

                tracing::debug!(sha = %body.sha, "Fetched catalog file");
                Ok(RemoteFile {
                    content: decode_content(&body.content)?,
                    version: VersionTag::new(body.sha),
                })
            }
            status => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(StoreError::RemoteUnavailable(format!(
                    "GET {} returned {}: {}",
                    self.contents_url, status, error_msg
                )))
            }
        }
    }

    async fn write_file(
        &self,
        content: &str,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        if self.token.is_none() {
            return Err(StoreError::WritePermissionDenied(
                "no write token configured".to_string(),
            ));
        }

        let body = UpdateRequest {
            message,
            content: encode_content(content),
            sha: expected.as_str(),
            branch: self.branch.as_deref(),
        };

        let request = self.client.put(&self.contents_url).json(&body);
        let response = self.authorized(request)?.send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let committed: UpdateResponse = response.json().await.map_err(|e| {
                    StoreError::Encoding(format!("unexpected update response: {}", e))
                })?;
                Ok(VersionTag::new(committed.content.sha))
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(StoreError::VersionConflict {
                    expected: expected.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "credential rejected".to_string());
                Err(StoreError::WritePermissionDenied(error_msg))
            }
            status => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(StoreError::RemoteUnavailable(format!(
                    "PUT {} returned {}: {}",
                    self.contents_url, status, error_msg
                )))
            }
        }
    }

    fn can_write(&self) -> bool {
        self.token.is_some()
    }
}
