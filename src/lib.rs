//! Galaxy Training Material scaffolding
//!
//! Topics and tutorials are directories of markdown, YAML and workflow files.
//! This crate creates those directories, keeps their metadata in sync, turns
//! Galaxy workflows into hands-on tutorial skeletons and fills data libraries
//! from Zenodo records.

pub mod domain;
pub use domain::{
    Config, DataLibrary, Error, Reference, Requirement, Topic, TopicType, Training,
    TrainingOptions, Tutorial,
};

/// Persistence helpers: YAML files, markdown documents and text templates.
pub mod storage;

/// Conversion of Galaxy workflows into tutorial hands-on sections.
pub mod workflow;

/// Clients for the external services (Zenodo and Galaxy).
pub mod remote;
