
use crate::services::base::status::merge_error::MergeError;
use serde_json::{Map, Value};

pub const TITLE_KEY: &str = "title";
pub const TAGS_KEY: &str = "tags";

/// Strongly typed fields the caller declares next to an otherwise opaque spec document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredFields {
    /// Overwrites the document's title when set and non-empty.
    pub title: Option<String>,
    /// Appended to the document's tags when set and non-empty.
    pub tags: Option<Vec<String>>,
}

/// Parses `document` and overlays the declared fields onto it.
/// Keys other than `title` and `tags` are left exactly as they were.
pub fn merge_spec(document: &str, declared: &DeclaredFields) -> Result<Map<String, Value>, MergeError> {
    let mut spec = parse_document(document)?;
    merge_into(&mut spec, declared);
    Ok(spec)
}

pub fn parse_document(document: &str) -> Result<Map<String, Value>, MergeError> {
    match serde_json::from_str(document).map_err(MergeError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        other => Err(MergeError::NotAnObject(json_type_name(&other).to_string())),
    }
}

pub fn merge_into(spec: &mut Map<String, Value>, declared: &DeclaredFields) {
    if let Some(title) = declared.title.as_deref().filter(|t| !t.is_empty()) {
        spec.insert(TITLE_KEY.to_string(), Value::String(title.to_string()));
    }

    if let Some(declared_tags) = declared.tags.as_ref().filter(|tags| !tags.is_empty()) {
        let mut tags = match spec.remove(TAGS_KEY) {
            Some(Value::Array(existing)) => existing,
            _ => Vec::new(),
        };
        for tag in declared_tags {
            if !tags.iter().any(|existing| existing.as_str() == Some(tag.as_str())) {
                tags.push(Value::String(tag.clone()));
            }
        }
        spec.insert(TAGS_KEY.to_string(), Value::Array(tags));
    }
}

/// Reads the string tags of a spec. Missing keys, `null`, non-array values and
/// non-string elements all read as nothing.
pub fn read_tags(spec: &Map<String, Value>) -> Vec<String> {
    spec.get(TAGS_KEY)
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn read_title(spec: &Map<String, Value>) -> Option<String> {
    spec.get(TITLE_KEY).and_then(Value::as_str).map(str::to_string)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
