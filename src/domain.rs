//! Domain models for training material.
//!
//! A [`Training`] session owns one [`Topic`] and hands out [`Tutorial`]s that
//! borrow it. Requirements, references and the data-library manifest are the
//! small value types persisted alongside them.

/// Prerequisites and bibliographic references.
pub mod requirement;
pub use requirement::{Reference, Requirement, RequirementType};

/// Subject-area folders grouping tutorials.
pub mod topic;
pub use topic::{Material, Topic, TopicType};

/// Single lessons inside a topic.
pub mod tutorial;
pub use tutorial::{Tutorial, TutorialMetadata, TutorialPaths};

mod training;
pub use training::{Created, Training, TrainingOptions};

/// The Galaxy data-library manifest.
pub mod data_library;
pub use data_library::DataLibrary;

/// Mapping from archive formats to Galaxy datatypes.
pub mod datatypes;
pub use datatypes::{DatatypeMap, get_galaxy_datatype};

mod config;
pub use config::Config;

mod error;
pub use error::Error;
