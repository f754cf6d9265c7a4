use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static REPEAT_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)_(\d+)$").expect("repeat segment pattern is valid"));

/// Rebuild the nested structure encoded in the keys of a step's input
/// connections.
///
/// Keys are `|`-separated parameter paths. A segment before the last one of
/// the form `name_<n>` is the `n`-th block of the repeat `name`, so
/// `tables_0|table` becomes `{"tables": {"0": {"table": ...}}}`. Indices stay
/// string keys to line up with the lookups done on parameter values. When two
/// keys lead to the same leaf, the first one wins.
#[must_use]
pub fn get_wf_inputs(connections: &Map<String, Value>) -> Value {
    let mut inputs = Map::new();
    for (key, connection) in connections {
        insert_path(&mut inputs, &path_of(key), connection);
    }
    Value::Object(inputs)
}

fn path_of(key: &str) -> Vec<String> {
    let segments: Vec<&str> = key.split('|').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Vec::new();
    };

    let mut path = Vec::with_capacity(segments.len() + 1);
    for segment in parents {
        if let Some(captures) = REPEAT_SEGMENT.captures(segment) {
            path.push(captures[1].to_string());
            path.push(captures[2].to_string());
        } else {
            path.push((*segment).to_string());
        }
    }
    path.push((*last).to_string());
    path
}

fn insert_path(node: &mut Map<String, Value>, path: &[String], connection: &Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        node.entry(head.clone())
            .or_insert_with(|| connection.clone());
        return;
    }

    let child = node
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(child) = child {
        insert_path(child, rest, connection);
    } else {
        tracing::debug!("'{head}' is both a parameter and a group; keeping the parameter");
    }
}
