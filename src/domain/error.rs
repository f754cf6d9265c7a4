use std::{io, path::PathBuf};

/// Errors raised by topic, tutorial and training operations.
///
/// Every error propagates to the command layer unchanged; nothing here is
/// retried or rolled back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required option is missing or inconsistent.
    #[error("{0}")]
    Configuration(String),

    /// A topic, tutorial or file that must already exist is absent.
    #[error("the {what} {} does not exist", path.display())]
    NotFound {
        /// What was expected (e.g. "topic").
        what: &'static str,
        /// Where it was expected.
        path: PathBuf,
    },

    /// A topic or tutorial that is about to be created is already there.
    #[error("the {what} {} already exists", path.display())]
    AlreadyExists {
        /// What was about to be created.
        what: &'static str,
        /// Where it already exists.
        path: PathBuf,
    },

    /// Zenodo or Galaxy failed or answered with something unexpected.
    #[error("external service error: {0}")]
    ExternalService(#[from] crate::remote::Error),

    /// A workflow could not be read or converted.
    #[error(transparent)]
    Workflow(#[from] crate::workflow::Error),

    /// A YAML file could not be read or written.
    #[error(transparent)]
    Yaml(#[from] crate::storage::yaml::Error),

    /// A tutorial document could not be parsed.
    #[error("failed to read tutorial document {}: {source}", path.display())]
    Markdown {
        /// The tutorial document.
        path: PathBuf,
        /// The underlying failure.
        source: crate::storage::markdown::LoadError,
    },

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }

    pub(crate) fn already_exists(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists {
            what,
            path: path.into(),
        }
    }
}
