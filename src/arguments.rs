//! @ai:module:intent Parse the payload of a //@Load annotation into a directive
//! @ai:module:layer application
//! @ai:module:public_api parse_payload, normalize_quotes
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true

use crate::annotation::{LoadDirective, LoadOptions};
use crate::error::{Error, Result};
use serde_json::Value;

/// @ai:intent Treat single quotes as JSON double quotes
/// @ai:example ("a, ['b']") -> "a, [\"b\"]"
/// @ai:effects pure
pub fn normalize_quotes(payload: &str) -> String {
    payload.replace('\'', "\"")
}

/// @ai:intent Parse `label, [globs...][, {options}]` into a LoadDirective
/// @ai:pre raw is the text between the parentheses of a //@Load marker
/// @ai:post label is trimmed and non-empty, globs is a non-empty list of strings
/// @ai:effects pure
/// @ai:edge_cases missing label, unbalanced brackets, options that are not an object
pub fn parse_payload(raw: &str) -> Result<LoadDirective> {
    let payload = normalize_quotes(raw);
    let commas = structural_commas(&payload);

    let label_comma = match commas.first() {
        Some(&idx) if !payload[..idx].contains(['[', '{']) => idx,
        _ => return Err(missing_label(raw)),
    };

    let label = payload[..label_comma].trim();
    if label.is_empty() {
        return Err(missing_label(raw));
    }

    // A second depth-0 comma can only follow the closing bracket of the glob array.
    let (globs_src, options_src) = match commas.last() {
        Some(&last) if last != label_comma => {
            (&payload[label_comma + 1..last], Some(&payload[last + 1..]))
        }
        _ => (&payload[label_comma + 1..], None),
    };

    let globs = parse_globs(globs_src, raw)?;
    let options = match options_src {
        Some(src) => parse_options(src, raw)?,
        None => LoadOptions::default(),
    };

    Ok(LoadDirective {
        label: label.to_string(),
        globs,
        options,
    })
}

fn missing_label(raw: &str) -> Error {
    Error::MissingLabel {
        payload: raw.to_string(),
    }
}

/// @ai:intent Byte offsets of commas outside any bracket, brace or string
/// @ai:effects pure
fn structural_commas(payload: &str) -> Vec<usize> {
    let mut commas = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in payload.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => commas.push(idx),
            _ => {}
        }
    }

    commas
}

/// @ai:intent Parse the glob array literal
/// @ai:effects pure
fn parse_globs(src: &str, raw: &str) -> Result<Vec<String>> {
    let invalid = |reason: String| Error::InvalidGlobs {
        payload: raw.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(src.trim()).map_err(|e| invalid(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(invalid(format!("found {} instead of an array", kind(&other)))),
    };

    if items.is_empty() {
        return Err(invalid("the array is empty".to_string()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(glob) => Ok(glob),
            other => Err(invalid(format!("element {} is {}", idx, kind(&other)))),
        })
        .collect()
}

/// @ai:intent Parse the options object literal, ignoring unknown keys
/// @ai:effects pure
fn parse_options(src: &str, raw: &str) -> Result<LoadOptions> {
    let invalid = |reason: String| Error::InvalidOptions {
        payload: raw.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(src.trim()).map_err(|e| invalid(e.to_string()))?;
    if !value.is_object() {
        return Err(invalid(format!("found {} instead of an object", kind(&value))));
    }

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
