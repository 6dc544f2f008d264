//! Argument validation against a [`ToolSpec`].

use serde_json::{Map, Value};

use super::{ParamType, ParameterSpec, ToolSpec};
use crate::error::ToolError;

/// Check `args` against `spec` and return the normalized argument object.
///
/// Optional parameters that are omitted or `null` take their declared
/// default. Integers sent as whole floats (`5.0`) are accepted and narrowed.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] naming the offending parameter when
/// `args` is not an object, has unexpected keys, misses a required key, or
/// carries a value of the wrong type or out of range.
pub fn validate_arguments(spec: &ToolSpec, args: &Value) -> Result<Value, ToolError> {
    let object = match args {
        Value::Object(map) => map,
        Value::String(raw) => {
            return Err(ToolError::invalid_args(format!(
                "arguments must be a JSON object, got text: {raw}"
            )));
        }
        other => {
            return Err(ToolError::invalid_args(format!(
                "expected a JSON object, got {}",
                json_type(other)
            )));
        }
    };

    if let Some(unknown) = object.keys().find(|k| spec.parameter(k).is_none()) {
        return Err(ToolError::invalid_args(format!(
            "unexpected parameter '{unknown}'"
        )));
    }

    let mut normalized = Map::new();
    for param in &spec.parameters {
        match object.get(&param.name).filter(|v| !v.is_null()) {
            Some(value) => {
                normalized.insert(param.name.clone(), check_value(param, value)?);
            }
            None if param.required => {
                return Err(ToolError::invalid_args(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            None => {
                if let Some(default) = &param.default {
                    normalized.insert(param.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(Value::Object(normalized))
}

fn check_value(param: &ParameterSpec, value: &Value) -> Result<Value, ToolError> {
    let mismatch = || {
        ToolError::invalid_args(format!(
            "parameter '{}' must be {}, got {}",
            param.name,
            param.kind.described(),
            json_type(value)
        ))
    };

    match param.kind {
        ParamType::String if value.is_string() => Ok(value.clone()),
        ParamType::Boolean if value.is_boolean() => Ok(value.clone()),
        ParamType::Number if value.is_number() => Ok(value.clone()),
        ParamType::Integer => {
            let n = as_integer(value).ok_or_else(mismatch)?;
            let below = param.minimum.is_some_and(|min| n < min);
            let above = param.maximum.is_some_and(|max| n > max);
            if below || above {
                return Err(ToolError::invalid_args(format!(
                    "parameter '{}' must be between {} and {}, got {n}",
                    param.name,
                    param.minimum.map_or_else(|| "-inf".to_owned(), |m| m.to_string()),
                    param.maximum.map_or_else(|| "inf".to_owned(), |m| m.to_string()),
                )));
            }
            Ok(Value::from(n))
        }
        _ => Err(mismatch()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_spec() -> ToolSpec {
        ToolSpec {
            name: "get_table_sample".into(),
            description: String::new(),
            parameters: vec![
                ParameterSpec::string("table_name", "").required(),
                ParameterSpec::integer("limit", "")
                    .with_default(5)
                    .with_range(1, 1000),
            ],
        }
    }

    #[test]
    fn test_applies_defaults() {
        let args = validate_arguments(&sample_spec(), &json!({"table_name": "sales"})).unwrap();
        assert_eq!(args, json!({"table_name": "sales", "limit": 5}));

        let args =
            validate_arguments(&sample_spec(), &json!({"table_name": "sales", "limit": null}))
                .unwrap();
        assert_eq!(args["limit"], 5);
    }

    #[test]
    fn test_narrows_whole_floats() {
        let args =
            validate_arguments(&sample_spec(), &json!({"table_name": "t", "limit": 10.0})).unwrap();
        assert_eq!(args["limit"], json!(10));
    }

    #[test]
    fn test_string_literal_arguments_ask_for_object() {
        let call: crate::message::ToolCall = serde_json::from_value(json!({
            "id": "c1",
            "type": "function",
            "function": {"name": "get_table_sample", "arguments": "\"sales\""}
        }))
        .unwrap();
        let err = validate_arguments(&sample_spec(), call.arguments()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments: arguments must be a JSON object, got text: sales"
        );
    }

    #[test]
    fn test_rejections_name_the_parameter() {
        let cases = [
            (json!({}), "missing required parameter 'table_name'"),
            (json!({"table_name": 5}), "parameter 'table_name' must be a string, got number"),
            (json!({"table_name": "t", "limit": "5"}), "parameter 'limit' must be an integer"),
            (json!({"table_name": "t", "limit": 0}), "must be between 1 and 1000, got 0"),
            (json!({"table_name": "t", "limit": 1001}), "must be between 1 and 1000"),
            (json!({"table_name": "t", "verbose": true}), "unexpected parameter 'verbose'"),
            (json!([1, 2]), "expected a JSON object, got array"),
            (json!("{not json"), "arguments must be a JSON object, got text: {not json"),
        ];
        for (args, expected) in cases {
            let err = validate_arguments(&sample_spec(), &args).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{args}: {err} should contain {expected}"
            );
        }
    }
}
