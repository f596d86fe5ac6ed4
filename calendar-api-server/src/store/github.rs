//! GitHub contents/git-data API backend.

use anyhow::Context;
use async_trait::async_trait;
use calendar_api_core::codec::{decode_base64_utf8, encode_base64_utf8};
use calendar_api_core::{StoreError, StoreResult, TreeStage};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ContentStore, TreeEntry};
use crate::config::Config;

const USER_AGENT_VALUE: &str = "calendar-api";
const ACCEPT_VALUE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Reads and writes files on one branch of one repository.
pub struct GitHubStore {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
}

/// Response of `GET /repos/{owner}/{repo}/contents/{path}` for a file.
#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: GitObject,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: GitObject,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Default headers sent with every upstream request.
fn default_headers(token: &str) -> Result<HeaderMap, reqwest::header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

async fn error_body(resp: Response) -> String {
    resp.text().await.unwrap_or_default()
}

impl GitHubStore {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let headers =
            default_headers(&config.gh_token).context("GH_TOKEN is not a valid header value")?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(GitHubStore {
            http,
            api_url: config.gh_api_url.trim_end_matches('/').to_string(),
            owner: config.gh_owner.clone(),
            repo: config.gh_repo.clone(),
            branch: config.gh_branch.clone(),
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, tail)
    }

    fn contents_url(&self, path: &str) -> String {
        self.repo_url(&format!("contents/{}", path))
    }

    fn ref_url(&self) -> String {
        self.repo_url(&format!("git/ref/heads/{}", self.branch))
    }

    fn commit_url(&self, sha: &str) -> String {
        self.repo_url(&format!("git/commits/{}", sha))
    }

    fn tree_url(&self, sha: &str) -> String {
        self.repo_url(&format!("git/trees/{}?recursive=1", sha))
    }

    async fn get_contents(&self, path: &str) -> StoreResult<Response> {
        debug!(path, branch = %self.branch, "GET contents");
        self.http
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(transport)
    }

    /// Concurrency token of the file currently at `path`, if there is one.
    ///
    /// Any non-success answer counts as "no file yet".
    async fn current_sha(&self, path: &str) -> StoreResult<Option<String>> {
        let resp = self.get_contents(path).await?;
        if !resp.status().is_success() {
            debug!(path, status = %resp.status(), "no existing file, creating");
            return Ok(None);
        }

        let text = resp.text().await.map_err(transport)?;
        let contents = parse_contents(path, &text)?;
        Ok(Some(contents.sha))
    }

    async fn fetch_stage<T: DeserializeOwned>(&self, stage: TreeStage, url: String) -> StoreResult<T> {
        debug!(%stage, %url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            warn!(%stage, %status, "tree listing stage failed");
            return Err(StoreError::Stage {
                stage,
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await.map_err(transport)?;
        serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            path: stage.to_string(),
            reason: format!("unexpected response: {}", e),
        })
    }
}

fn parse_contents(path: &str, text: &str) -> StoreResult<ContentsResponse> {
    serde_json::from_str(text).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: format!("unexpected contents response: {}", e),
    })
}

/// Turn a contents API response body into the JSON document it carries.
fn decode_document(path: &str, text: &str) -> StoreResult<Value> {
    let contents = parse_contents(path, text)?;

    let encoded = contents.content.ok_or_else(|| StoreError::Decode {
        path: path.to_string(),
        reason: "response carries no inline content".to_string(),
    })?;

    let decoded = decode_base64_utf8(&encoded).map_err(|reason| StoreError::Decode {
        path: path.to_string(),
        reason,
    })?;

    serde_json::from_str(&decoded).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn read_json(&self, path: &str) -> StoreResult<Value> {
        let resp = self.get_contents(path).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            warn!(path, %status, "content read failed");
            return Err(if status == StatusCode::NOT_FOUND {
                StoreError::NotFound {
                    path: path.to_string(),
                    body,
                }
            } else {
                StoreError::Upstream {
                    operation: format!("GET {}", path),
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let text = resp.text().await.map_err(transport)?;
        decode_document(path, &text)
    }

    async fn write_json(&self, path: &str, value: &Value, message: &str) -> StoreResult<()> {
        let sha = self.current_sha(path).await?;
        let pretty = serde_json::to_string_pretty(value)?;

        let body = PutContentsRequest {
            message,
            content: encode_base64_utf8(&pretty),
            branch: &self.branch,
            sha: sha.as_deref(),
        };

        debug!(path, update = sha.is_some(), "PUT contents");
        let resp = self
            .http
            .put(self.contents_url(path))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            warn!(path, %status, "content write failed");
            return Err(StoreError::Upstream {
                operation: format!("PUT {}", path),
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn list_tree(&self) -> StoreResult<Vec<TreeEntry>> {
        let head: RefResponse = self.fetch_stage(TreeStage::Ref, self.ref_url()).await?;
        let commit: CommitResponse = self
            .fetch_stage(TreeStage::Commit, self.commit_url(&head.object.sha))
            .await?;
        let tree: TreeResponse = self
            .fetch_stage(TreeStage::Tree, self.tree_url(&commit.tree.sha))
            .await?;

        if tree.truncated {
            warn!(entries = tree.tree.len(), "repository tree listing was truncated upstream");
        }

        Ok(tree.tree)
    }
}
