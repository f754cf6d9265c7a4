use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::storage::yaml::{self, load_yaml};

/// Returned in place of a datatype when a format has no mapping.
pub const MISSING_DATATYPE: &str =
    "# Please add a Galaxy datatype or update the shared/datatypes.yaml file";

/// Mapping from the formats reported by Zenodo to Galaxy datatypes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DatatypeMap(HashMap<String, String>);

impl DatatypeMap {
    /// Read a mapping file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or is not a flat mapping of
    /// strings.
    pub fn load(path: &Path) -> Result<Self, yaml::Error> {
        load_yaml(path)
    }

    /// Read a mapping file, or start from an empty mapping when it cannot
    /// be read.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load datatypes: {e}");
            Self::default()
        })
    }

    /// The Galaxy datatype for a format, if mapped.
    #[must_use]
    pub fn get(&self, format: &str) -> Option<&str> {
        self.0.get(format).map(String::as_str)
    }

    /// The Galaxy datatype for a format, or [`MISSING_DATATYPE`].
    #[must_use]
    pub fn datatype_or_missing(&self, format: &str) -> String {
        self.get(format).map_or_else(
            || {
                tracing::warn!("No Galaxy datatype for '{format}'");
                MISSING_DATATYPE.to_string()
            },
            ToString::to_string,
        )
    }
}

impl FromIterator<(String, String)> for DatatypeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Look up the Galaxy datatype of a format in the mapping file at `path`.
///
/// Never fails: an unmapped format, or a mapping file that cannot be read,
/// yields [`MISSING_DATATYPE`].
#[must_use]
pub fn get_galaxy_datatype(format: &str, path: &Path) -> String {
    DatatypeMap::load_or_default(path).datatype_or_missing(format)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    const DATATYPES: &str = "---\ncsv: csv\nfastq: fastqsanger\ngtf: gtf\ntxt: txt\n";

    #[test_case("csv", "csv"; "identity")]
    #[test_case("fastq", "fastqsanger"; "renamed")]
    #[test_case("unknown_format", MISSING_DATATYPE; "unmapped")]
    fn lookup(format: &str, expected: &str) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("datatypes.yaml");
        std::fs::write(&path, DATATYPES).unwrap();

        assert_eq!(get_galaxy_datatype(format, &path), expected);
    }

    #[test]
    fn missing_mapping_file() {
        let tmp = TempDir::new().unwrap();
        let datatype = get_galaxy_datatype("csv", &tmp.path().join("missing.yaml"));
        assert!(datatype.contains("Please add a Galaxy datatype"));
    }

    #[test]
    fn map_from_pairs() {
        let map: DatatypeMap = [("fq".to_string(), "fastqsanger".to_string())]
            .into_iter()
            .collect();
        assert_eq!(map.get("fq"), Some("fastqsanger"));
        assert_eq!(map.get("fa"), None);
        assert_eq!(map.datatype_or_missing("fq"), "fastqsanger");
        assert_eq!(map.datatype_or_missing("fa"), MISSING_DATATYPE);
    }
}
