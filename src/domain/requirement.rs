use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Whether a requirement points inside the training material or elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    /// Another topic or tutorial of the training material.
    #[default]
    Internal,
    /// An external resource.
    External,
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => f.write_str("internal"),
            Self::External => f.write_str("external"),
        }
    }
}

/// A prerequisite learners should go through before a topic or tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Where the requirement lives.
    #[serde(rename = "type", default)]
    pub kind: RequirementType,
    /// Link to the requirement.
    pub link: String,
}

impl Default for Requirement {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: RequirementType::Internal,
            link: "/introduction/".to_string(),
        }
    }
}

impl Requirement {
    /// Create a requirement.
    #[must_use]
    pub fn new(title: impl Into<String>, kind: RequirementType, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            link: link.into(),
        }
    }

    /// Export as an ordered mapping with the keys `title`, `type`, `link`.
    #[must_use]
    pub fn export_to_mapping(&self) -> Mapping {
        let mut req = Mapping::new();
        req.insert("title".into(), self.title.clone().into());
        req.insert("type".into(), self.kind.to_string().into());
        req.insert("link".into(), self.link.clone().into());
        req
    }
}

/// A bibliographic reference attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Authors of the referenced work.
    pub authors: String,
    /// Title of the referenced work.
    pub title: String,
    /// Link to the referenced work.
    pub link: String,
    /// Why the reference is useful.
    pub summary: String,
}

impl Default for Reference {
    fn default() -> Self {
        Self {
            authors: "authors et al".to_string(),
            title: "the title".to_string(),
            link: "link".to_string(),
            summary: "Why this reference is useful".to_string(),
        }
    }
}

impl Reference {
    /// Create a reference.
    #[must_use]
    pub fn new(
        authors: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            authors: authors.into(),
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
        }
    }

    /// Export as an ordered mapping with the keys `authors`, `title`, `link`,
    /// `summary`.
    #[must_use]
    pub fn export_to_mapping(&self) -> Mapping {
        let mut reference = Mapping::new();
        reference.insert("authors".into(), self.authors.clone().into());
        reference.insert("title".into(), self.title.clone().into());
        reference.insert("link".into(), self.link.clone().into());
        reference.insert("summary".into(), self.summary.clone().into());
        reference
    }
}

#[cfg(test)]
pub(crate) fn keys(mapping: &Mapping) -> Vec<&str> {
    mapping.keys().filter_map(serde_yaml::Value::as_str).collect()
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;

    #[test]
    fn requirement_defaults() {
        let req = Requirement::default();
        assert_eq!(req.title, "");
        assert_eq!(req.kind, RequirementType::Internal);
        assert_eq!(req.link, "/introduction/");
    }

    #[test]
    fn requirement_with_values() {
        let req = Requirement::new("Introduction", RequirementType::External, "URL");
        assert_eq!(req.title, "Introduction");
        assert_eq!(req.kind, RequirementType::External);
        assert_eq!(req.link, "URL");
    }

    #[test]
    fn requirement_export_keeps_key_order() {
        let exported = Requirement::new("Intro", RequirementType::External, "URL").export_to_mapping();
        assert_eq!(keys(&exported), ["title", "type", "link"]);
        assert_eq!(exported["title"], Value::from("Intro"));
        assert_eq!(exported["type"], Value::from("external"));
        assert_eq!(exported["link"], Value::from("URL"));
    }

    #[test]
    fn reference_defaults() {
        let reference = Reference::default();
        assert_eq!(reference.authors, "authors et al");
        assert_eq!(reference.title, "the title");
        assert_eq!(reference.link, "link");
        assert_eq!(reference.summary, "Why this reference is useful");
    }

    #[test]
    fn reference_export_keeps_key_order() {
        let exported =
            Reference::new("the authors", "a title", "URL", "The summary").export_to_mapping();
        assert_eq!(keys(&exported), ["authors", "title", "link", "summary"]);
        assert_eq!(exported["title"], Value::from("a title"));
        assert_eq!(exported["summary"], Value::from("The summary"));
    }

    #[test]
    fn export_matches_serde_representation() {
        let req = Requirement::default();
        let serialized = serde_yaml::to_value(&req).unwrap();
        assert_eq!(serialized, Value::Mapping(req.export_to_mapping()));
    }
}
