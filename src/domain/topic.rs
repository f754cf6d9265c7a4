use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::{Error, Reference, Requirement, TrainingOptions};
use crate::storage::{load_yaml, save_to_yaml, templates};

/// The audience of a topic.
///
/// Values other than `use` and `admin` are kept as read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopicType {
    /// Tutorials for Galaxy users.
    #[default]
    Use,
    /// Tutorials for Galaxy administrators.
    Admin,
    /// Any other audience, such as `admin-dev` or `instructors`.
    Other(String),
}

impl TopicType {
    /// The value stored in the topic metadata.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Use => "use",
            Self::Admin => "admin",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TopicType {
    fn from(s: &str) -> Self {
        match s {
            "use" => Self::Use,
            "admin" => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TopicType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "use" => Self::Use,
            "admin" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<TopicType> for String {
    fn from(kind: TopicType) -> Self {
        match kind {
            TopicType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// A subject-area folder grouping tutorials.
///
/// All paths derive from `parent_dir` and `name`, so renaming a topic moves
/// every file it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Directory name of the topic.
    pub name: String,
    /// Audience of the topic.
    pub kind: TopicType,
    /// Human-readable title.
    pub title: String,
    /// One-paragraph summary.
    pub summary: String,
    /// Docker image bundling the tools of the topic.
    pub docker_image: String,
    /// Maintainers of the topic.
    pub maintainers: Vec<String>,
    /// Prerequisites of the topic.
    pub requirements: Vec<Requirement>,
    /// Bibliographic references.
    pub references: Vec<Reference>,
    parent_dir: PathBuf,
    metadata_dir: PathBuf,
}

impl Default for Topic {
    fn default() -> Self {
        Self::new(
            "new_topic",
            TopicType::Use,
            "The new topic",
            "Summary",
            "topics",
        )
    }
}

impl Topic {
    /// Create a topic below `parent_dir`.
    ///
    /// A topic for users starts with one default requirement and one default
    /// reference; an admin topic starts with neither.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: TopicType,
        title: impl Into<String>,
        summary: impl Into<String>,
        parent_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut topic = Self {
            name: name.into(),
            kind,
            title: title.into(),
            summary: summary.into(),
            docker_image: String::new(),
            maintainers: vec!["maintainers".to_string()],
            requirements: Vec::new(),
            references: Vec::new(),
            parent_dir: parent_dir.into(),
            metadata_dir: PathBuf::from("metadata"),
        };
        topic.set_default_requirement();
        topic.set_default_reference();
        topic
    }

    /// Replace the default requirements.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Replace the default references.
    #[must_use]
    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    /// Set the directory holding the topics.
    #[must_use]
    pub fn with_parent_dir(mut self, parent_dir: impl Into<PathBuf>) -> Self {
        self.parent_dir = parent_dir.into();
        self
    }

    /// Set where the copy of the topic metadata is written.
    #[must_use]
    pub fn with_metadata_dir(mut self, metadata_dir: impl Into<PathBuf>) -> Self {
        self.metadata_dir = metadata_dir.into();
        self
    }

    /// Apply the topic options of an invocation.
    ///
    /// Options left unset keep their current value. Default requirements and
    /// references are recomputed for the resulting type.
    pub fn init_from_kwds(&mut self, options: &TrainingOptions) {
        if let Some(name) = &options.topic_name {
            self.name.clone_from(name);
        }
        if let Some(kind) = &options.topic_target {
            self.kind.clone_from(kind);
        }
        if let Some(title) = &options.topic_title {
            self.title.clone_from(title);
        }
        if let Some(summary) = &options.topic_summary {
            self.summary.clone_from(summary);
        }
        self.set_default_requirement();
        self.set_default_reference();
    }

    /// Read the descriptive fields back from `metadata.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata file is missing or invalid.
    pub fn init_from_metadata(&mut self) -> Result<(), Error> {
        let metadata: StoredMetadata = load_yaml(&self.metadata_fp())?;
        self.kind = metadata.kind;
        self.title = metadata.title;
        self.summary = metadata.summary;
        self.docker_image = metadata.docker_image;
        self.maintainers = metadata.maintainers;
        self.requirements = metadata.requirements;
        self.references = metadata.references;
        Ok(())
    }

    fn set_default_requirement(&mut self) {
        self.requirements.clear();
        if self.kind == TopicType::Use {
            self.requirements.push(Requirement::default());
        }
    }

    fn set_default_reference(&mut self) {
        self.references.clear();
        if self.kind == TopicType::Use {
            self.references.push(Reference::default());
        }
    }

    /// The directory of the topic.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.parent_dir.join(&self.name)
    }

    /// The folder of topic-level images.
    #[must_use]
    pub fn img_folder(&self) -> PathBuf {
        self.dir().join("images")
    }

    /// The folder holding the tutorials.
    #[must_use]
    pub fn tuto_folder(&self) -> PathBuf {
        self.dir().join("tutorials")
    }

    /// The landing page of the topic.
    #[must_use]
    pub fn index_fp(&self) -> PathBuf {
        self.dir().join("index.md")
    }

    /// The readme of the topic.
    #[must_use]
    pub fn readme_fp(&self) -> PathBuf {
        self.dir().join("README.md")
    }

    /// The metadata file of the topic.
    #[must_use]
    pub fn metadata_fp(&self) -> PathBuf {
        self.dir().join("metadata.yaml")
    }

    /// The copy of the metadata file kept in the shared metadata directory.
    #[must_use]
    pub fn metadata_copy_fp(&self) -> PathBuf {
        self.metadata_dir.join(format!("{}.yaml", self.name))
    }

    /// The Docker recipe of the topic.
    #[must_use]
    pub fn dockerfile_fp(&self) -> PathBuf {
        self.dir().join("docker").join("Dockerfile")
    }

    /// The introduction slide deck of the topic.
    #[must_use]
    pub fn intro_slide_fp(&self) -> PathBuf {
        self.dir().join("slides").join("introduction.html")
    }

    /// Whether the topic directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.dir().is_dir()
    }

    /// Export the topic metadata with the keys `name`, `type`, `title`,
    /// `summary`, `requirements`, `docker_image`, `maintainers`,
    /// `references`.
    #[must_use]
    pub fn export_metadata_to_mapping(&self) -> Mapping {
        let requirements = self
            .requirements
            .iter()
            .map(|req| Value::Mapping(req.export_to_mapping()))
            .collect::<Vec<_>>();
        let references = self
            .references
            .iter()
            .map(|reference| Value::Mapping(reference.export_to_mapping()))
            .collect::<Vec<_>>();
        let maintainers = self
            .maintainers
            .iter()
            .map(|maintainer| Value::from(maintainer.as_str()))
            .collect::<Vec<_>>();

        let mut metadata = Mapping::new();
        metadata.insert("name".into(), self.name.as_str().into());
        metadata.insert("type".into(), self.kind.to_string().into());
        metadata.insert("title".into(), self.title.as_str().into());
        metadata.insert("summary".into(), self.summary.as_str().into());
        metadata.insert("requirements".into(), Value::Sequence(requirements));
        metadata.insert("docker_image".into(), self.docker_image.as_str().into());
        metadata.insert("maintainers".into(), Value::Sequence(maintainers));
        metadata.insert("references".into(), Value::Sequence(references));
        metadata
    }

    /// Create the directory tree of the topic and its fixed files.
    ///
    /// Besides the topic directory, a copy of the metadata is written to the
    /// shared metadata directory. Nothing is rolled back if a write fails
    /// midway.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the topic directory exists, and an
    /// error if any file cannot be written.
    pub fn create_topic_structure(&self) -> Result<(), Error> {
        if self.exists() {
            return Err(Error::already_exists("topic", self.dir()));
        }

        fs::create_dir_all(self.img_folder())?;
        fs::create_dir_all(self.tuto_folder())?;

        write(&self.index_fp(), &templates::topic_index(&self.name))?;
        write(&self.readme_fp(), &templates::topic_readme(&self.title))?;

        let metadata = self.export_metadata_to_mapping();
        save_to_yaml(&metadata, &self.metadata_fp())?;

        write(
            &self.dockerfile_fp(),
            &templates::topic_dockerfile(&self.name, &self.title),
        )?;
        write(
            &self.intro_slide_fp(),
            &templates::topic_intro_slides(&self.title),
        )?;

        save_to_yaml(&metadata, &self.metadata_copy_fp())?;

        tracing::debug!("created topic structure in {}", self.dir().display());
        Ok(())
    }

    /// Insert or replace the `material` entry of a tutorial in the topic
    /// metadata, matching on the tutorial name.
    ///
    /// The copy in the shared metadata directory is updated too when it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic metadata cannot be read or written.
    pub fn upsert_material(&self, material: &Material) -> Result<(), Error> {
        let mut metadata: Mapping = load_yaml(&self.metadata_fp())?;
        let entry = serde_yaml::to_value(material).map_err(|source| {
            crate::storage::yaml::Error::Parse {
                path: self.metadata_fp(),
                source,
            }
        })?;

        let materials = metadata
            .entry("material".into())
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !materials.is_sequence() {
            *materials = Value::Sequence(Vec::new());
        }
        if let Value::Sequence(materials) = materials {
            let existing = materials.iter_mut().find(|existing| {
                existing.get("name").and_then(Value::as_str) == Some(material.name.as_str())
            });
            match existing {
                Some(existing) => *existing = entry,
                None => materials.push(entry),
            }
        }

        save_to_yaml(&metadata, &self.metadata_fp())?;

        let copy = self.metadata_copy_fp();
        if copy.is_file() {
            save_to_yaml(&metadata, &copy)?;
        }
        Ok(())
    }
}

fn write(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// The fields of a topic's `metadata.yaml` read back into a [`Topic`].
#[derive(Debug, Deserialize)]
struct StoredMetadata {
    #[serde(rename = "type", default)]
    kind: TopicType,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    docker_image: String,
    #[serde(default)]
    maintainers: Vec<String>,
    #[serde(default)]
    requirements: Vec<Requirement>,
    #[serde(default)]
    references: Vec<Reference>,
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The entry describing one tutorial in the `material` list of the topic
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Tutorial title.
    pub title: String,
    /// Tutorial directory name.
    pub name: String,
    /// Always `tutorial`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Zenodo record with the input data.
    pub zenodo_link: String,
    /// Whether the tutorial has a hands-on document.
    pub hands_on: bool,
    /// Whether the tutorial has slides.
    pub slides: bool,
    /// Whether the tutorial ships a workflow.
    pub workflows: bool,
    /// Questions answered by the tutorial.
    pub questions: Vec<String>,
    /// Learning objectives.
    pub objectives: Vec<String>,
    /// Expected duration.
    pub time_estimation: String,
    /// Take-home messages.
    pub key_points: Vec<String>,
    /// Authors of the tutorial.
    pub contributors: Vec<String>,
}
