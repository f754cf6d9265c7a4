use std::path::Path;

use serde_json::Value;

use super::{Error, ToolInput, Workflow, WorkflowStep, get_wf_inputs, get_wf_param_values};
use crate::{
    remote::{GalaxyClient, ToolCatalog},
    storage::templates::{self, SPACE},
};

/// Render one hands-on section per tool step of a workflow, in step order.
///
/// Parameters are described from the tool's input description when the
/// catalog has one; otherwise the merged parameter values are listed as-is.
#[must_use]
pub fn format_wf_steps(workflow: &Workflow, catalog: &dyn ToolCatalog) -> String {
    let describer = Describer { workflow };
    let mut tools = String::new();

    for (key, step) in workflow.ordered_steps() {
        if !step.is_tool() {
            continue;
        }
        let Some(tool_state) = step.tool_state.as_ref().filter(|state| !is_empty(state)) else {
            tracing::debug!("step {key} has no tool state");
            continue;
        };

        let connections = get_wf_inputs(&step.input_connections);
        let params = get_wf_param_values(tool_state, &connections);
        if is_empty(&params) {
            continue;
        }

        let description = step.tool_id.as_deref().and_then(|tool_id| {
            catalog
                .show_tool(tool_id)
                .inspect_err(|e| tracing::warn!("No description for tool {tool_id}: {e}"))
                .ok()
        });
        let paramlist = description.map_or_else(
            || describer.values(&params, 1),
            |description| describer.inputs(&description.inputs, &params, 1),
        );

        tools.push_str(&templates::hands_on_box(&step.name, &paramlist));
    }

    tools
}

/// Render the hands-on sections of a workflow file.
///
/// # Errors
///
/// Returns an error if the file is not a readable workflow.
pub fn hands_on_boxes_from_local_galaxy(
    path: &Path,
    catalog: &dyn ToolCatalog,
) -> Result<String, Error> {
    let workflow = Workflow::load(path)?;
    Ok(format_wf_steps(&workflow, catalog))
}

/// Render the hands-on sections of a workflow stored on a Galaxy server.
///
/// # Errors
///
/// Returns an error if the workflow cannot be exported or decoded.
pub fn hands_on_boxes_from_running_galaxy(
    workflow_id: &str,
    client: &GalaxyClient,
) -> Result<String, Error> {
    let workflow = Workflow::from_value(client.export_workflow_dict(workflow_id)?)?;
    Ok(format_wf_steps(&workflow, client))
}

struct Describer<'a> {
    workflow: &'a Workflow,
}

impl Describer<'_> {
    fn inputs(&self, inputs: &[ToolInput], values: &Value, level: usize) -> String {
        inputs
            .iter()
            .map(|input| self.input(input, values.get(&input.name), level, false))
            .collect()
    }

    fn input(
        &self,
        input: &ToolInput,
        value: Option<&Value>,
        level: usize,
        force_default: bool,
    ) -> String {
        let Some(value) = value.filter(|value| !is_empty(value)) else {
            tracing::trace!("{} not in workflow", input.name);
            return String::new();
        };

        match input.input_type.as_str() {
            "data" | "data_collection" => self.data(input.display_label(), value, level),
            "section" => self.section(input, value, level),
            "conditional" => self.conditional(input, value, level),
            "repeat" => self.repeat(input, value, level),
            _ => param(input, value, level, force_default),
        }
    }

    fn data(&self, label: &str, value: &Value, level: usize) -> String {
        let (icon, sources): (_, Vec<_>) = match value {
            Value::Array(connections) => (
                "param-files",
                connections
                    .iter()
                    .filter_map(|connection| self.source(connection))
                    .collect(),
            ),
            connection => {
                let icon = if self.is_collection(connection) {
                    "param-collection"
                } else {
                    "param-file"
                };
                (icon, self.source(connection).into_iter().collect())
            }
        };

        if sources.is_empty() {
            return String::new();
        }
        templates::input_file_line(&space(level), icon, label, &sources.join(", "))
    }

    fn section(&self, input: &ToolInput, value: &Value, level: usize) -> String {
        let nested = self.inputs(&input.inputs, value, level + 1);
        if nested.is_empty() {
            return nested;
        }
        templates::section_line(&space(level), group_label(input)) + &nested
    }

    fn conditional(&self, input: &ToolInput, value: &Value, level: usize) -> String {
        let Some(test_param) = input.test_param.as_deref() else {
            return String::new();
        };
        let Some(selected) = value.get(&test_param.name) else {
            tracing::warn!("{} not in workflow", test_param.name);
            return String::new();
        };

        let mut desc = self.input(test_param, Some(selected), level, true);
        let selected = scalar(selected);
        for case in &input.cases {
            if case.value == selected && !case.inputs.is_empty() {
                desc.push_str(&self.inputs(&case.inputs, value, level + 1));
            }
        }
        desc
    }

    fn repeat(&self, input: &ToolInput, value: &Value, level: usize) -> String {
        let Value::Array(blocks) = value else {
            return String::new();
        };
        let title = group_label(input);

        let mut repeated = String::new();
        for block in blocks {
            let nested = self.inputs(&input.inputs, block, level + 2);
            if !nested.is_empty() {
                repeated.push_str(&templates::repeat_line(&space(level + 1), title));
                repeated.push_str(&nested);
            }
        }

        if repeated.is_empty() {
            return repeated;
        }
        templates::section_line(&space(level), title) + &repeated
    }

    /// Describe merged values without a tool description.
    fn values(&self, values: &Value, level: usize) -> String {
        let Value::Object(values) = values else {
            return String::new();
        };
        values
            .iter()
            .filter(|(name, _)| !name.starts_with("__"))
            .map(|(name, value)| self.value(name, value, level))
            .collect()
    }

    fn value(&self, name: &str, value: &Value, level: usize) -> String {
        if is_connection(value) || connection_list(value) {
            return self.data(name, value, level);
        }

        match value {
            Value::Null => String::new(),
            Value::Object(_) => {
                let nested = self.values(value, level + 1);
                if nested.is_empty() {
                    return nested;
                }
                templates::section_line(&space(level), name) + &nested
            }
            Value::Array(blocks) if blocks.iter().any(Value::is_object) => {
                let mut repeated = String::new();
                for block in blocks {
                    let nested = self.values(block, level + 2);
                    if !nested.is_empty() {
                        repeated.push_str(&templates::repeat_line(&space(level + 1), name));
                        repeated.push_str(&nested);
                    }
                }
                if repeated.is_empty() {
                    return repeated;
                }
                templates::section_line(&space(level), name) + &repeated
            }
            scalar_value => templates::param_line(&space(level), name, &scalar(scalar_value)),
        }
    }

    /// "`output` (output of **Tool** {% icon tool %})" for a connection.
    fn source(&self, connection: &Value) -> Option<String> {
        let output = connection.get("output_name")?.as_str()?;
        let step = step_key(connection.get("id")?)?;

        let provenance = self.workflow.step(&step).map(|step| {
            if step.is_input() {
                format!(" ({})", step.name)
            } else {
                format!(" (output of **{}** {{% icon tool %}})", step.name)
            }
        });
        Some(format!("`{output}`{}", provenance.unwrap_or_default()))
    }

    fn is_collection(&self, connection: &Value) -> bool {
        connection
            .get("id")
            .and_then(step_key)
            .and_then(|key| self.workflow.step(&key))
            .is_some_and(WorkflowStep::is_collection)
    }
}

fn param(input: &ToolInput, value: &Value, level: usize, force_default: bool) -> String {
    if !force_default && same_value(&input.value, value) {
        return String::new();
    }

    let rendered = match input.input_type.as_str() {
        "boolean" => {
            let checked = as_bool(value);
            if !force_default && as_bool(&input.value) == checked {
                return String::new();
            }
            if checked { "Yes" } else { "No" }.to_string()
        }
        "select" => select_labels(input, value).unwrap_or_else(|| scalar(value)),
        "data_column" => format!("c{}", scalar(value)),
        _ => scalar(value),
    };

    templates::param_line(&space(level), input.display_label(), &rendered)
}

/// Labels of the selected options, if any option matches.
fn select_labels(input: &ToolInput, value: &Value) -> Option<String> {
    let selected: Vec<String> = match value {
        Value::Array(values) => values.iter().map(scalar).collect(),
        value => vec![scalar(value)],
    };

    let labels: Vec<String> = input
        .options
        .iter()
        .filter_map(Value::as_array)
        .filter(|option| {
            option
                .get(1)
                .is_some_and(|option_value| selected.contains(&scalar(option_value)))
        })
        .filter_map(|option| option.first().map(scalar))
        .collect();

    (!labels.is_empty()).then(|| labels.join(", "))
}

fn group_label(input: &ToolInput) -> &str {
    input
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| input.display_label())
}

fn space(level: usize) -> String {
    SPACE.repeat(level)
}

fn step_key(id: &Value) -> Option<String> {
    match id {
        Value::Number(id) => Some(id.to_string()),
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

fn is_connection(value: &Value) -> bool {
    value.get("output_name").is_some() && value.get("id").is_some()
}

fn connection_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if !items.is_empty() && items.iter().all(is_connection))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// The text form of a value: strings unquoted, lists comma separated.
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
    }
}

fn same_value(default: &Value, value: &Value) -> bool {
    default == value || (!default.is_null() && !value.is_object() && scalar(default) == scalar(value))
}
