//! HTTP implementation of [`LabelService`].

use super::{ApiError, LabelService};
use relabel_event::{Project, ProjectDelta};
use relabel_types::ProjectId;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Label service reached over HTTP with `reqwest`.
///
/// # Example
///
/// ```
/// use relabel_runtime::api::HttpLabelService;
/// use std::time::Duration;
///
/// let service = HttpLabelService::new("http://127.0.0.1:5000/", Duration::from_secs(5)).unwrap();
/// assert_eq!(service.base_url(), "http://127.0.0.1:5000");
///
/// assert!(HttpLabelService::new("not a url", Duration::from_secs(5)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct HttpLabelService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLabelService {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] if `base_url` does not parse
    /// - [`ApiError::Transport`] if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn post<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).send().await?;
        decode(response).await
    }
}

/// Turns a response into `T`, or the matching [`ApiError`].
///
/// An empty 2xx body decodes as `T::default()`.
async fn decode<T: DeserializeOwned + Default>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::rejected(status.as_u16(), &body));
    }
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl LabelService for HttpLabelService {
    async fn load_project(&self, project: &ProjectId) -> Result<Project, ApiError> {
        let url = self.url(&format!("project/{project}"));
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn edit(
        &self,
        project: &ProjectId,
        action: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<ProjectDelta, ApiError> {
        let url = self.url(&format!("edit/{project}/{action}"));
        debug!(%url, args = args.len(), "POST");
        let response = self.client.post(&url).form(args).send().await?;
        decode(response).await
    }

    async fn undo(&self, project: &ProjectId) -> Result<ProjectDelta, ApiError> {
        self.post(&format!("undo/{project}")).await
    }

    async fn redo(&self, project: &ProjectId) -> Result<ProjectDelta, ApiError> {
        self.post(&format!("redo/{project}")).await
    }

    async fn change_display(
        &self,
        project: &ProjectId,
        dimension: &str,
        value: usize,
    ) -> Result<ProjectDelta, ApiError> {
        self.post(&format!("changedisplay/{project}/{dimension}/{value}"))
            .await
    }

    async fn toggle_rgb(&self, project: &ProjectId, rgb: bool) -> Result<ProjectDelta, ApiError> {
        self.post(&format!("rgb/{project}/{rgb}")).await
    }
}
