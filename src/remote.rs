use std::time::Duration;

/// The Galaxy API: workflow export and tool descriptions.
pub mod galaxy;
pub use galaxy::{GalaxyClient, OfflineCatalog, ToolCatalog};

/// The Zenodo records API.
pub mod zenodo;
pub use zenodo::{ZenodoClient, ZenodoFile, ZenodoRecord, parse_record_id};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while talking to Zenodo or Galaxy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The returned status.
        status: reqwest::StatusCode,
    },

    /// The service answered with something other than what was expected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service is not configured for this invocation.
    #[error("{0}")]
    Unavailable(String),
}

fn http_client() -> Result<reqwest::blocking::Client, Error> {
    reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(Error::Http)
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            url: response.url().to_string(),
            status,
        })
    }
}
