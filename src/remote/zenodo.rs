use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{Error, check_status, http_client};

static RECORD_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"zenodo\.org/(?:api/)?records?/(\d+)").expect("record URL pattern is valid")
});

static RECORD_DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.5281/zenodo\.(\d+)").expect("DOI pattern is valid"));

/// The parts of a Zenodo record used to build data libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZenodoRecord {
    /// Files attached to the record.
    #[serde(default)]
    pub files: Vec<ZenodoFile>,
}

/// One file of a Zenodo record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZenodoFile {
    /// File name.
    pub key: String,
    /// Declared format, when Zenodo reports one.
    #[serde(rename = "type", default)]
    pub file_type: Option<String>,
    /// Links to the file.
    pub links: ZenodoFileLinks,
}

impl ZenodoFile {
    /// The declared format, or the extension of the file name.
    #[must_use]
    pub fn format(&self) -> &str {
        match self.file_type.as_deref() {
            Some(file_type) if !file_type.is_empty() => file_type,
            _ => self
                .key
                .rsplit_once('.')
                .map_or(self.key.as_str(), |(_, extension)| extension),
        }
    }
}

/// Links attached to a Zenodo file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZenodoFileLinks {
    /// Download URL of the file.
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Extract the record id from a record URL or a Zenodo DOI.
///
/// Accepts `https://zenodo.org/record/<id>`, `https://zenodo.org/records/<id>`,
/// API URLs, `10.5281/zenodo.<id>` in any form (`doi.org` links included),
/// and falls back to a trailing numeric path segment.
#[must_use]
pub fn parse_record_id(link: &str) -> Option<String> {
    let link = link.trim();
    if let Some(captures) = RECORD_URL
        .captures(link)
        .or_else(|| RECORD_DOI.captures(link))
    {
        return Some(captures[1].to_string());
    }

    let last = link.trim_end_matches('/').rsplit('/').next()?;
    (!last.is_empty() && last.chars().all(|c| c.is_ascii_digit())).then(|| last.to_string())
}

/// A blocking client for the Zenodo records API.
#[derive(Debug, Clone)]
pub struct ZenodoClient {
    api_base: String,
    client: reqwest::blocking::Client,
}

impl ZenodoClient {
    /// Create a client for the API at `api_base` (e.g. `https://zenodo.org/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(api_base: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    /// Fetch the record a link points to.
    ///
    /// Returns the record id with its payload. A link without a recognisable
    /// record id, or a record Zenodo does not know, yields `None` with an
    /// empty record; callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any other reason or the
    /// payload cannot be decoded.
    pub fn get_zenodo_record(&self, link: &str) -> Result<(Option<String>, ZenodoRecord), Error> {
        let Some(record_id) = parse_record_id(link) else {
            tracing::debug!("no Zenodo record id in '{link}'");
            return Ok((None, ZenodoRecord::default()));
        };

        let url = format!("{}/records/{record_id}", self.api_base);
        tracing::debug!("fetching Zenodo record {url}");
        let response = self.client.get(&url).send()?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            tracing::debug!("Zenodo record {record_id} not found");
            return Ok((None, ZenodoRecord::default()));
        }

        let record = check_status(response)?
            .json::<ZenodoRecord>()
            .map_err(|e| Error::InvalidResponse(format!("Failed to parse Zenodo record: {e}")))?;

        Ok((Some(record_id), record))
    }
}
