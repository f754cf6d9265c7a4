use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::domain::TutorialMetadata;

/// The Jekyll layout of hands-on tutorials.
const HANDS_ON_LAYOUT: &str = "tutorial_hands_on";

/// A tutorial serialized as markdown with YAML front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialDocument {
    /// The metadata block at the top of the document.
    pub metadata: TutorialMetadata,
    /// Everything after the front matter.
    pub body: String,
}

impl TutorialDocument {
    /// Render the front matter block (without the `---` fences).
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be serialized.
    pub fn front_matter(metadata: &TutorialMetadata) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(metadata)
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let front_matter = Self::front_matter(&self.metadata).map_err(io::Error::other)?;
        let result = format!(
            "---\nlayout: {HANDS_ON_LAYOUT}\n\n{front_matter}---\n{}",
            self.body
        );
        writer.write_all(result.as_bytes())?;
        writer.flush()
    }

    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self, LoadError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Split the front matter from the body. The body is kept byte for
    /// byte, line endings included.
    fn parse(content: &str) -> Result<Self, LoadError> {
        let mut lines = content.split_inclusive('\n');

        let first_line = lines.next().ok_or(LoadError::MissingFrontMatter)?;
        if first_line.trim() != "---" {
            return Err(LoadError::MissingFrontMatter);
        }

        let start = first_line.len();
        let mut offset = start;
        for line in lines {
            let end = offset;
            offset += line.len();
            if line.trim() == "---" {
                let metadata = serde_yaml::from_str(&content[start..end])?;
                return Ok(Self {
                    metadata,
                    body: content[offset..].to_string(),
                });
            }
        }

        Err(LoadError::MissingFrontMatter)
    }

    /// Write the document to a file.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)
    }

    /// Read a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if the file does not exist, and an
    /// error if it cannot be read or has no valid front matter.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;

        let mut reader = BufReader::new(file);
        Self::read(&mut reader)
    }
}

/// Errors that can occur when loading a tutorial document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document was not found.
    #[error("document not found")]
    NotFound,
    /// The document does not start with a `---` delimited metadata block.
    #[error("no metadata found at the top of the tutorial")]
    MissingFrontMatter,
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The front matter could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;

    const DOCUMENT: &str = r"---
layout: tutorial_hands_on

title: Quality control
zenodo_link: https://zenodo.org/record/1321885
questions:
- Which biological questions are addressed by the tutorial?
objectives:
- Learn things
time_estimation: 3H
key_points:
- The take-home messages
contributors:
- contributor1
---

# Introduction

This body has --- in it
";

    #[test]
    fn read_document() {
        let mut reader = Cursor::new(DOCUMENT);
        let document = TutorialDocument::read(&mut reader).unwrap();

        assert_eq!(document.metadata.title, "Quality control");
        assert_eq!(
            document.metadata.zenodo_link,
            "https://zenodo.org/record/1321885"
        );
        assert_eq!(document.metadata.time_estimation, "3H");
        assert_eq!(document.metadata.contributors, ["contributor1"]);
        assert_eq!(document.body, "\n# Introduction\n\nThis body has --- in it\n");
    }

    #[test]
    fn body_is_kept_verbatim() {
        let content = "---\r\ntitle: Windows\r\n---\r\n\r\n# Introduction\r\n\r\nText\r\n\n";
        let document = TutorialDocument::read(&mut Cursor::new(content)).unwrap();

        assert_eq!(document.metadata.title, "Windows");
        assert_eq!(document.body, "\r\n# Introduction\r\n\r\nText\r\n\n");
    }

    #[test]
    fn missing_front_matter() {
        let mut reader = Cursor::new("# Just a title\n");
        let result = TutorialDocument::read(&mut reader);
        assert!(matches!(result, Err(LoadError::MissingFrontMatter)));
    }

    #[test]
    fn unterminated_front_matter() {
        let mut reader = Cursor::new("---\ntitle: Unclosed\n");
        let result = TutorialDocument::read(&mut reader);
        assert!(matches!(result, Err(LoadError::MissingFrontMatter)));
    }

    #[test]
    fn empty_input() {
        let mut reader = Cursor::new("");
        let result = TutorialDocument::read(&mut reader);
        assert!(matches!(result, Err(LoadError::MissingFrontMatter)));
    }

    #[test]
    fn invalid_yaml() {
        let mut reader = Cursor::new("---\ntitle: [unclosed\n---\nbody\n");
        let result = TutorialDocument::read(&mut reader);
        assert!(matches!(result, Err(LoadError::Yaml(_))));
    }

    #[test]
    fn save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tuto").join("tutorial.md");
        let document = TutorialDocument {
            metadata: TutorialMetadata {
                title: "Saved tutorial".to_string(),
                questions: vec!["q1".to_string(), "q2".to_string()],
                ..TutorialMetadata::default()
            },
            body: "\n# Introduction\n\nSome text\n".to_string(),
        };

        document.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("---\nlayout: tutorial_hands_on\n"));
        assert!(written.contains("title: Saved tutorial"));
        assert!(written.contains("- q1"));

        let loaded = TutorialDocument::load(&path).unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn load_nonexistent_file() {
        let tmp = TempDir::new().unwrap();
        let result = TutorialDocument::load(&tmp.path().join("tutorial.md"));
        assert!(matches!(result, Err(LoadError::NotFound)));
    }
}
