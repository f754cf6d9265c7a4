use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

/// Errors that can occur when reading or writing a YAML file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file does not exist.
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The content is not valid YAML for the expected shape.
    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_yaml::Error,
    },
}

/// Load the content of a YAML file.
///
/// Key order of mappings is preserved when loading into
/// [`serde_yaml::Mapping`] or [`serde_yaml::Value`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the file does not exist, and an error if it
/// cannot be read or does not deserialize into `T`.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_yaml::from_str(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a value to a YAML file.
///
/// The document starts with an explicit `---` marker and is written in block
/// style with two-space indentation, as UTF-8 with unicode left unescaped.
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or the file cannot be
/// written.
pub fn save_to_yaml<T: Serialize + ?Sized>(content: &T, path: &Path) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let body = serde_yaml::to_string(content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    fs::write(path, format!("---\n{body}")).map_err(io_error)
}
