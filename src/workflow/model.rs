use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::Error;

/// A Galaxy workflow export (`.ga` file or API download).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    /// Workflow name.
    #[serde(default)]
    pub name: String,
    /// Steps keyed by their position in the workflow.
    #[serde(default)]
    pub steps: BTreeMap<String, WorkflowStep>,
}

impl Workflow {
    /// Read a workflow file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a workflow.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Interpret an already decoded workflow export.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a workflow.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// The step with the given key.
    #[must_use]
    pub fn step(&self, key: &str) -> Option<&WorkflowStep> {
        self.steps.get(key)
    }

    /// Steps in workflow order (numeric key order, so `10` follows `9`).
    pub fn ordered_steps(&self) -> impl Iterator<Item = (&str, &WorkflowStep)> {
        let mut steps: Vec<_> = self
            .steps
            .iter()
            .map(|(key, step)| (key.as_str(), step))
            .collect();
        steps.sort_by_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), *key));
        steps.into_iter()
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkflowStep {
    /// Position of the step.
    #[serde(default)]
    pub id: Option<u64>,
    /// Tool name, or the kind of input for input steps.
    #[serde(default)]
    pub name: String,
    /// User-given label.
    #[serde(default)]
    pub label: Option<String>,
    /// Tool id, for tool steps.
    #[serde(default)]
    pub tool_id: Option<String>,
    /// `tool`, `data_input`, `data_collection_input`, `parameter_input`, ...
    #[serde(rename = "type", default)]
    pub step_type: String,
    /// Links from parameter paths (`tables_0|table`) to upstream outputs.
    #[serde(default)]
    pub input_connections: Map<String, Value>,
    /// Parameter values, usually a JSON document encoded as a string.
    #[serde(default)]
    pub tool_state: Option<Value>,
}

impl WorkflowStep {
    /// Whether the step runs a tool.
    #[must_use]
    pub fn is_tool(&self) -> bool {
        self.step_type == "tool" || (self.step_type.is_empty() && self.tool_id.is_some())
    }

    /// Whether the step produces a dataset collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.step_type.contains("collection")
    }

    /// Whether the step is a workflow input.
    #[must_use]
    pub fn is_input(&self) -> bool {
        self.step_type.ends_with("input") || self.name.contains("Input dataset")
    }
}

/// The parameter description of a tool, as returned by
/// `GET /api/tools/{id}?io_details=true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolDescription {
    /// Tool name.
    #[serde(default)]
    pub name: String,
    /// Top-level inputs.
    #[serde(default)]
    pub inputs: Vec<ToolInput>,
}

/// One input of a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolInput {
    /// Parameter name.
    pub name: String,
    /// Label shown in the tool form.
    #[serde(default)]
    pub label: Option<String>,
    /// Title of sections and repeats.
    #[serde(default)]
    pub title: Option<String>,
    /// `data`, `select`, `section`, `conditional`, `repeat`, ...
    #[serde(rename = "type", default)]
    pub input_type: String,
    /// Default value.
    #[serde(default)]
    pub value: Value,
    /// `[label, value, selected]` triples of select parameters.
    #[serde(default)]
    pub options: Vec<Value>,
    /// Nested inputs of sections and repeats.
    #[serde(default)]
    pub inputs: Vec<ToolInput>,
    /// The selector of a conditional.
    #[serde(default)]
    pub test_param: Option<Box<ToolInput>>,
    /// The branches of a conditional.
    #[serde(default)]
    pub cases: Vec<ToolCase>,
}

impl ToolInput {
    /// The most descriptive name available.
    #[must_use]
    pub fn display_label(&self) -> &str {
        [self.label.as_deref(), self.title.as_deref()]
            .into_iter()
            .flatten()
            .find(|label| !label.is_empty())
            .unwrap_or(&self.name)
    }
}

/// A branch of a conditional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolCase {
    /// Selector value activating the branch.
    #[serde(default)]
    pub value: String,
    /// Inputs of the branch.
    #[serde(default)]
    pub inputs: Vec<ToolInput>,
}
