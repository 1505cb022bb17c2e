//! HTTP client for the Socket REST API
//!
//! One method per endpoint the CLI needs. Every call is a single request;
//! callers await them one at a time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use socket_core::config::SocketConfig;

use crate::error::ApiError;
use crate::models::{
    AnalyticsRow, Artifact, AuditLogPage, AuditLogQuery, CreateScanParams, DependencySearch,
    FullScan, FullScanDiff, FullScanList, FullScanQuery, LicensePolicy, OrganizationsResponse,
    PurlScore, RepoParams, RepoQuery, Repository, RepositoryList, SecurityPolicy, SupportedFiles,
    ThreatFeedPage, ThreatFeedQuery,
};
use crate::ndjson::{NdjsonBatch, parse_ndjson, parse_scan_document};

/// Connection settings for [`SocketClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub token: String,
    pub base_url: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl ClientOptions {
    /// Builds options from a loaded config. Fails without a token.
    pub fn from_config(config: &SocketConfig) -> Result<Self, ApiError> {
        let token = config.token().ok_or(ApiError::MissingToken)?;
        Ok(Self {
            token: token.to_owned(),
            base_url: config.api.base_url.clone(),
            proxy: Some(config.api.proxy.clone()).filter(|p| !p.is_empty()),
            timeout: Duration::from_secs(config.api.timeout_secs),
        })
    }
}

/// Async Socket API client.
#[derive(Debug, Clone)]
pub struct SocketClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SocketClient {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        if options.token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let base_url = Url::parse(&options.base_url).map_err(|e| {
            ApiError::InvalidRequest(format!("invalid base URL '{}': {e}", options.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL '{}' cannot carry a path",
                options.base_url
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("socket-cli/{}", socket_core::VERSION))
            .timeout(options.timeout);
        if let Some(proxy) = options.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: options.token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ---- organizations & policies ----

    pub async fn organizations(&self) -> Result<OrganizationsResponse, ApiError> {
        self.get_json(&["organizations"], &[]).await
    }

    pub async fn security_policy(&self, org: &str) -> Result<SecurityPolicy, ApiError> {
        self.get_json(&["orgs", org, "settings", "security-policy"], &[])
            .await
    }

    pub async fn license_policy(&self, org: &str) -> Result<LicensePolicy, ApiError> {
        self.get_json(&["orgs", org, "settings", "license-policy"], &[])
            .await
    }

    // ---- full scans ----

    pub async fn list_full_scans(
        &self,
        org: &str,
        query: &FullScanQuery,
    ) -> Result<FullScanList, ApiError> {
        self.get_json(&["orgs", org, "full-scans"], &query.pairs())
            .await
    }

    /// Uploads manifest files as a new full scan. File parts are named by
    /// their path relative to `root`.
    pub async fn create_full_scan(
        &self,
        org: &str,
        params: &CreateScanParams,
        root: &Path,
        files: &[PathBuf],
    ) -> Result<FullScan, ApiError> {
        if files.is_empty() {
            return Err(ApiError::InvalidRequest(
                "no manifest files to upload".to_owned(),
            ));
        }

        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(file).await.map_err(|source| ApiError::Io {
                path: file.display().to_string(),
                source,
            })?;
            let name = upload_name(root, file);
            debug!(file = %name, size = bytes.len(), "adding manifest to upload");
            form = form.part(name.clone(), Part::bytes(bytes).file_name(name));
        }

        let url = self.endpoint(&["orgs", org, "full-scans"], &params.pairs())?;
        let response = self
            .request(Method::POST, url)
            .multipart(form)
            .send()
            .await?;
        decode_json(check_status(response).await?).await
    }

    /// Artifacts of a full scan, decoded line by line.
    pub async fn full_scan_artifacts(
        &self,
        org: &str,
        scan_id: &str,
    ) -> Result<NdjsonBatch<Artifact>, ApiError> {
        let url = self.endpoint(&["orgs", org, "full-scans", scan_id], &[])?;
        let response = check_status(self.request(Method::GET, url).send().await?).await?;
        let body = response.text().await?;
        parse_scan_document(&body)
    }

    pub async fn full_scan_metadata(&self, org: &str, scan_id: &str) -> Result<FullScan, ApiError> {
        self.get_json(&["orgs", org, "full-scans", scan_id, "metadata"], &[])
            .await
    }

    pub async fn delete_full_scan(
        &self,
        org: &str,
        scan_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["orgs", org, "full-scans", scan_id], &[])?;
        let response = self.request(Method::DELETE, url).send().await?;
        decode_json(check_status(response).await?).await
    }

    pub async fn full_scan_diff(
        &self,
        org: &str,
        before: &str,
        after: &str,
    ) -> Result<FullScanDiff, ApiError> {
        let query = [("before", before.to_owned()), ("after", after.to_owned())];
        self.get_json(&["orgs", org, "full-scans", "diff"], &query)
            .await
    }

    // ---- repositories ----

    pub async fn list_repos(
        &self,
        org: &str,
        query: &RepoQuery,
    ) -> Result<RepositoryList, ApiError> {
        self.get_json(&["orgs", org, "repos"], &query.pairs()).await
    }

    pub async fn view_repo(&self, org: &str, slug: &str) -> Result<Repository, ApiError> {
        self.get_json(&["orgs", org, "repos", slug], &[]).await
    }

    pub async fn create_repo(
        &self,
        org: &str,
        params: &RepoParams,
    ) -> Result<Repository, ApiError> {
        let url = self.endpoint(&["orgs", org, "repos"], &[])?;
        let response = self.request(Method::POST, url).json(params).send().await?;
        decode_json(check_status(response).await?).await
    }

    pub async fn update_repo(
        &self,
        org: &str,
        slug: &str,
        params: &RepoParams,
    ) -> Result<Repository, ApiError> {
        let url = self.endpoint(&["orgs", org, "repos", slug], &[])?;
        let response = self.request(Method::POST, url).json(params).send().await?;
        decode_json(check_status(response).await?).await
    }

    pub async fn delete_repo(&self, org: &str, slug: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["orgs", org, "repos", slug], &[])?;
        let response = self.request(Method::DELETE, url).send().await?;
        decode_json(check_status(response).await?).await
    }

    // ---- analytics & audit log ----

    pub async fn org_analytics(&self, days: u32) -> Result<Vec<AnalyticsRow>, ApiError> {
        let days = days.to_string();
        self.get_json(&["analytics", "org", &days], &[]).await
    }

    pub async fn repo_analytics(
        &self,
        repo: &str,
        days: u32,
    ) -> Result<Vec<AnalyticsRow>, ApiError> {
        let days = days.to_string();
        self.get_json(&["analytics", "repo", repo, &days], &[]).await
    }

    pub async fn audit_log(
        &self,
        org: &str,
        query: &AuditLogQuery,
    ) -> Result<AuditLogPage, ApiError> {
        self.get_json(&["orgs", org, "audit-log"], &query.pairs())
            .await
    }

    // ---- packages ----

    /// Deep score of a package and its transitive dependencies.
    pub async fn purl_score(&self, org: &str, purl: &str) -> Result<PurlScore, ApiError> {
        self.get_json(&["orgs", org, "purl", "score", purl], &[]).await
    }

    /// Shallow lookup of many packages at once, alerts included.
    pub async fn batch_package_fetch(
        &self,
        purls: &[String],
    ) -> Result<NdjsonBatch<Artifact>, ApiError> {
        if purls.is_empty() {
            return Err(ApiError::InvalidRequest("no package URLs given".to_owned()));
        }
        let components: Vec<_> = purls.iter().map(|purl| json!({ "purl": purl })).collect();
        let url = self.endpoint(&["purl"], &[("alerts", "true".to_owned())])?;
        let response = self
            .request(Method::POST, url)
            .json(&json!({ "components": components }))
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        Ok(parse_ndjson(&body))
    }

    pub async fn search_dependencies(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<DependencySearch, ApiError> {
        let url = self.endpoint(&["dependencies", "search"], &[])?;
        let response = self
            .request(Method::POST, url)
            .json(&json!({ "limit": limit, "offset": offset }))
            .send()
            .await?;
        decode_json(check_status(response).await?).await
    }

    pub async fn threat_feed(
        &self,
        org: &str,
        query: &ThreatFeedQuery,
    ) -> Result<ThreatFeedPage, ApiError> {
        self.get_json(&["orgs", org, "threat-feed"], &query.pairs())
            .await
    }

    /// Manifest filename patterns the API accepts, per ecosystem.
    pub async fn supported_files(&self) -> Result<SupportedFiles, ApiError> {
        self.get_json(&["report", "supported"], &[]).await
    }

    // ---- plumbing ----

    /// Joins path segments onto the base URL. Segments are percent-encoded,
    /// so a purl's `/` stays inside one segment.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest("base URL cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "socket api request");
        self.http
            .request(method, url)
            .basic_auth(&self.token, None::<&str>)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        let response = self.request(Method::GET, url).send().await?;
        decode_json(check_status(response).await?).await
    }
}

/// Passes successful responses through; turns the rest into [`ApiError`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, cause) = error_message(status, &body);
    warn!(status = status.as_u16(), %message, "socket api request failed");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Auth {
            status: status.as_u16(),
            message,
        });
    }
    Err(ApiError::Http {
        status: status.as_u16(),
        message,
        cause,
    })
}

/// Pulls `error.message` / `error.details` out of an API error body.
fn error_message(status: StatusCode, body: &str) -> (String, Option<String>) {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_owned)
        .or_else(|| Some(body.trim().to_owned()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });

    let cause = error.and_then(|e| e.get("details")).and_then(|d| match d {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });

    (message, cause)
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
        cause: e.to_string(),
    })
}

fn upload_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
