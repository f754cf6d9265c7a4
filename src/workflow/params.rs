use serde_json::{Map, Value};

/// Markers Galaxy leaves in the tool state for values supplied at runtime or
/// through a connection.
const RUNTIME_CLASSES: [&str; 2] = ["RuntimeValue", "ConnectedValue"];

/// Merge a step's tool state with its (nested) input connections.
///
/// The tool state stores nested values as JSON encoded strings; these are
/// decoded. Values marked as runtime or connected are replaced by the
/// matching connection, or dropped when there is none. Galaxy's bookkeeping
/// keys (`__page__`, `__current_case__`, ...) are dropped.
#[must_use]
pub fn get_wf_param_values(tool_state: &Value, connections: &Value) -> Value {
    match decode(tool_state) {
        Value::Object(params) => Value::Object(merge_object(&params, connections)),
        Value::Array(values) => Value::Array(merge_array(&values, connections)),
        other => other,
    }
}

fn decode(value: &Value) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

fn runtime_class(params: &Map<String, Value>) -> Option<&str> {
    params
        .get("__class__")
        .and_then(Value::as_str)
        .filter(|class| RUNTIME_CLASSES.contains(class))
}

fn merge_object(params: &Map<String, Value>, connections: &Value) -> Map<String, Value> {
    let mut merged = Map::new();
    for (name, value) in params {
        if name.starts_with("__") {
            continue;
        }
        let connection = connections.get(name).unwrap_or(&Value::Null);
        if let Some(value) = merge_value(value, connection) {
            merged.insert(name.clone(), value);
        }
    }
    merged
}

fn merge_array(values: &[Value], connections: &Value) -> Vec<Value> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let connection = connections
                .get(index.to_string())
                .unwrap_or(&Value::Null);
            merge_value(value, connection).unwrap_or(Value::Null)
        })
        .collect()
}

fn merge_value(value: &Value, connection: &Value) -> Option<Value> {
    match decode(value) {
        Value::Object(params) if runtime_class(&params).is_some() => {
            (!connection.is_null()).then(|| connection.clone())
        }
        Value::Object(params) => Some(Value::Object(merge_object(&params, connection))),
        Value::Array(values) => Some(Value::Array(merge_array(&values, connection))),
        // a null with a connection is a data input wired up in the editor
        Value::Null if !connection.is_null() => Some(connection.clone()),
        other => Some(other),
    }
}
