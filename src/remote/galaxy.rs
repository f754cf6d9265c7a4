use serde::Deserialize;
use serde_json::Value;

use super::{Error, check_status, http_client};
use crate::workflow::ToolDescription;

/// Something that can describe the inputs of a Galaxy tool.
pub trait ToolCatalog {
    /// The input description of a tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or the catalog is unreachable.
    fn show_tool(&self, tool_id: &str) -> Result<ToolDescription, Error>;
}

/// A catalog for when no Galaxy server is configured.
///
/// Every lookup fails, so parameters are rendered from the workflow alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalog;

impl ToolCatalog for OfflineCatalog {
    fn show_tool(&self, tool_id: &str) -> Result<ToolDescription, Error> {
        Err(Error::Unavailable(format!(
            "no Galaxy server to describe {tool_id}"
        )))
    }
}

/// The account an API key belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GalaxyUser {
    /// Encoded user id; absent for anonymous sessions.
    #[serde(default)]
    pub id: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// A blocking client for a running Galaxy instance.
#[derive(Debug, Clone)]
pub struct GalaxyClient {
    url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GalaxyClient {
    /// Create a client for the Galaxy at `url`, authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http_client()?,
        })
    }

    /// Base URL of the instance.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::blocking::Response, Error> {
        let url = format!("{}/api/{path}", self.url);
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()?;
        check_status(response)
    }

    /// The user owning the API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the key is not accepted.
    pub fn current_user(&self) -> Result<GalaxyUser, Error> {
        let user: GalaxyUser = self.get("users/current", &[])?.json()?;
        if user.id.is_none() {
            return Err(Error::InvalidResponse(format!(
                "the API key is not accepted by {}",
                self.url
            )));
        }
        Ok(user)
    }

    /// Export a stored workflow in the `.ga` format.
    ///
    /// # Errors
    ///
    /// Returns an error if the workflow cannot be downloaded.
    pub fn export_workflow_dict(&self, workflow_id: &str) -> Result<Value, Error> {
        let user = self.current_user()?;
        tracing::debug!(
            "exporting workflow {workflow_id} as {}",
            user.username.as_deref().unwrap_or("unknown user")
        );
        let workflow = self
            .get(
                &format!("workflows/{workflow_id}/download"),
                &[("format", "json-download")],
            )?
            .json()?;
        Ok(workflow)
    }
}

impl ToolCatalog for GalaxyClient {
    fn show_tool(&self, tool_id: &str) -> Result<ToolDescription, Error> {
        self.get(&format!("tools/{tool_id}"), &[("io_details", "true")])?
            .json()
            .map_err(|e| Error::InvalidResponse(format!("Failed to parse tool {tool_id}: {e}")))
    }
}
