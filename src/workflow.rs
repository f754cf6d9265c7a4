use std::{io, path::PathBuf};

mod inputs;
pub use inputs::get_wf_inputs;

mod model;
pub use model::{ToolCase, ToolDescription, ToolInput, Workflow, WorkflowStep};

mod params;
pub use params::get_wf_param_values;

mod render;
pub use render::{
    format_wf_steps, hands_on_boxes_from_local_galaxy, hands_on_boxes_from_running_galaxy,
};

/// Errors raised while reading or converting a workflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workflow file could not be read.
    #[error("failed to read workflow {}: {source}", path.display())]
    Io {
        /// The workflow file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The workflow is not valid JSON or lacks the expected structure.
    #[error("invalid workflow: {0}")]
    Json(#[from] serde_json::Error),

    /// The workflow could not be exported from Galaxy.
    #[error(transparent)]
    Remote(#[from] crate::remote::Error),
}
