/// Tutorial documents: YAML front matter followed by a markdown body.
pub mod markdown;
/// Fixed text templates for generated files.
pub mod templates;
/// YAML load/save with the formatting used across the material.
pub mod yaml;

pub use markdown::{LoadError, TutorialDocument};
pub use yaml::{load_yaml, save_to_yaml};
