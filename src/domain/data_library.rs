use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::yaml::{self, load_yaml, save_to_yaml};

/// A manifest describing how sample files are organised once loaded into a
/// Galaxy data library.
///
/// ```yaml
/// destination:
///   type: library
///   name: GTN - Material
/// items:
/// - name: <topic title>
///   items:
///   - name: <tutorial title>
///     items:
///     - url: https://zenodo.org/...
///       src: url
///       ext: fastqsanger
///       info: https://zenodo.org/record/...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLibrary {
    /// Where the files go.
    #[serde(default)]
    pub destination: Destination,
    /// Top-level folders, one per topic.
    #[serde(default)]
    pub items: Vec<LibraryEntry>,
}

/// The library receiving the files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Always `library`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Library name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short description of the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Longer description of the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            kind: "library".to_string(),
            name: Some("GTN - Material".to_string()),
            description: Some("Galaxy Training Network Material".to_string()),
            synopsis: Some(
                "Galaxy Training Network Material. See https://training.galaxyproject.org"
                    .to_string(),
            ),
        }
    }
}

/// A node of the manifest: either a folder or a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibraryEntry {
    /// A named folder with nested entries.
    Folder(LibraryFolder),
    /// A file to fetch.
    File(LibraryFile),
}

impl LibraryEntry {
    fn folder_named_mut(&mut self, name: &str) -> Option<&mut LibraryFolder> {
        match self {
            Self::Folder(folder) if folder.name == name => Some(folder),
            _ => None,
        }
    }
}

/// A folder of the data library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFolder {
    /// Folder name (a topic or tutorial title).
    pub name: String,
    /// Optional folder description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Nested entries.
    pub items: Vec<LibraryEntry>,
}

impl LibraryFolder {
    /// Create an empty folder.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            items: Vec::new(),
        }
    }

    /// Run `f` on the sub-folder called `name`, creating it at the end of
    /// the entries if there is none.
    pub fn with_folder<R>(
        &mut self,
        name: &str,
        description: Option<String>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        with_folder(&mut self.items, name, description, f)
    }

    /// The files directly inside this folder.
    pub fn files(&self) -> impl Iterator<Item = &LibraryFile> {
        self.items.iter().filter_map(|entry| match entry {
            LibraryEntry::File(file) => Some(file),
            LibraryEntry::Folder(_) => None,
        })
    }

    /// Append files, skipping those whose URL is already listed.
    ///
    /// Returns the number of files added.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = LibraryFile>) -> usize {
        let mut added = 0;
        for file in files {
            if self.files().any(|existing| existing.url == file.url) {
                tracing::debug!("{} already in the data library", file.url);
                continue;
            }
            self.items.push(LibraryEntry::File(file));
            added += 1;
        }
        added
    }
}

/// A file fetched by URL into the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFile {
    /// Download URL.
    pub url: String,
    /// How to fetch the file; always `url`.
    #[serde(default = "default_src")]
    pub src: String,
    /// Galaxy datatype of the file.
    pub ext: String,
    /// Where the file comes from (the Zenodo record link).
    #[serde(default)]
    pub info: String,
}

impl LibraryFile {
    /// A file fetched from `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, ext: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            src: default_src(),
            ext: ext.into(),
            info: info.into(),
        }
    }
}

fn default_src() -> String {
    "url".to_string()
}

fn with_folder<R>(
    items: &mut Vec<LibraryEntry>,
    name: &str,
    description: Option<String>,
    f: impl FnOnce(&mut LibraryFolder) -> R,
) -> R {
    if let Some(folder) = items
        .iter_mut()
        .find_map(|entry| entry.folder_named_mut(name))
    {
        return f(folder);
    }

    tracing::debug!("adding folder '{name}' to the data library");
    let mut folder = LibraryFolder::new(name, description);
    let result = f(&mut folder);
    items.push(LibraryEntry::Folder(folder));
    result
}

impl DataLibrary {
    /// Read a manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a valid manifest.
    pub fn load(path: &Path) -> Result<Self, yaml::Error> {
        load_yaml(path)
    }

    /// Write the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), yaml::Error> {
        save_to_yaml(self, path)
    }

    /// Run `f` on the top-level folder called `name`, creating it if
    /// needed.
    pub fn with_folder<R>(
        &mut self,
        name: &str,
        description: Option<String>,
        f: impl FnOnce(&mut LibraryFolder) -> R,
    ) -> R {
        with_folder(&mut self.items, name, description, f)
    }

    /// Locate a top-level folder by name.
    #[must_use]
    pub fn folder(&self, name: &str) -> Option<&LibraryFolder> {
        self.items.iter().find_map(|entry| match entry {
            LibraryEntry::Folder(folder) if folder.name == name => Some(folder),
            _ => None,
        })
    }

    /// Run `f` on the folder of a tutorial inside the folder of its topic,
    /// creating either when missing.
    ///
    /// Entries for other topics and tutorials are left untouched.
    pub fn with_tutorial_folder<R>(
        &mut self,
        topic_title: &str,
        topic_summary: &str,
        tutorial_title: &str,
        f: impl FnOnce(&mut LibraryFolder) -> R,
    ) -> R {
        self.with_folder(topic_title, Some(topic_summary.to_string()), |topic| {
            topic.with_folder(tutorial_title, None, f)
        })
    }
}
