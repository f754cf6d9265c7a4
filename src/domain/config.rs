use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Repository-level settings for the training material.
///
/// Paths are relative to the root of the material. Values given on the
/// command line take precedence over the ones stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Directory holding one folder per topic.
    pub topics_dir: PathBuf,

    /// Directory holding a copy of every topic's `metadata.yaml`.
    pub metadata_dir: PathBuf,

    /// YAML mapping from archive formats to Galaxy datatypes.
    pub datatypes: PathBuf,

    /// Base URL of the Galaxy instance used to export workflows.
    pub galaxy_url: Option<String>,

    /// API key for that Galaxy instance.
    pub galaxy_api_key: Option<String>,

    /// Base URL of the Zenodo REST API.
    pub zenodo_api: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics_dir: default_topics_dir(),
            metadata_dir: default_metadata_dir(),
            datatypes: default_datatypes(),
            galaxy_url: None,
            galaxy_api_key: None,
            zenodo_api: default_zenodo_api(),
        }
    }
}

impl Config {
    /// Location of the configuration file below the material root.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(".training").join("config.toml")
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration of the material at `root`, falling back to the
    /// defaults when there is none.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(&Self::path(root)).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

fn default_topics_dir() -> PathBuf {
    PathBuf::from("topics")
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("metadata")
}

fn default_datatypes() -> PathBuf {
    PathBuf::from("shared").join("datatypes.yaml")
}

fn default_zenodo_api() -> String {
    "https://zenodo.org/api".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_topics_dir")]
        topics_dir: PathBuf,

        #[serde(default = "default_metadata_dir")]
        metadata_dir: PathBuf,

        #[serde(default = "default_datatypes")]
        datatypes: PathBuf,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        galaxy_url: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        galaxy_api_key: Option<String>,

        #[serde(default = "default_zenodo_api")]
        zenodo_api: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                topics_dir,
                metadata_dir,
                datatypes,
                galaxy_url,
                galaxy_api_key,
                zenodo_api,
            } => Self {
                topics_dir,
                metadata_dir,
                datatypes,
                galaxy_url,
                galaxy_api_key,
                zenodo_api,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            topics_dir: config.topics_dir,
            metadata_dir: config.metadata_dir,
            datatypes: config.datatypes,
            galaxy_url: config.galaxy_url,
            galaxy_api_key: config.galaxy_api_key,
            zenodo_api: config.zenodo_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ntopics_dir = \"lessons\"\ngalaxy_url = \"https://usegalaxy.eu\"\ngalaxy_api_key = \"secret\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.topics_dir, PathBuf::from("lessons"));
        assert_eq!(config.metadata_dir, PathBuf::from("metadata"));
        assert_eq!(config.galaxy_url.as_deref(), Some("https://usegalaxy.eu"));
        assert_eq!(config.galaxy_api_key.as_deref(), Some("secret"));
        assert_eq!(config.zenodo_api, "https://zenodo.org/api");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nzenodo_api = 3\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(tmp.path()), Config::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            galaxy_url: Some("http://localhost:8080".to_string()),
            ..Config::default()
        };

        config.save(&Config::path(tmp.path())).unwrap();

        assert_eq!(Config::load_or_default(tmp.path()), config);
    }
}
