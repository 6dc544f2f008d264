//! Function dispatch.
//!
//! [`Dispatcher::dispatch`] is the boundary between model output and the data
//! store. Whatever the model sends, the answer is a JSON object with a
//! `success` flag: `{"success": true, ...output}` or
//! `{"success": false, "error": reason}`.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use super::{ToolRegistry, ToolSpec, validate_arguments};
use crate::error::ToolError;
use crate::store::DataStore;

/// Routes function calls to registered tools.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    store: Arc<DataStore>,
}

impl Dispatcher {
    /// Create a dispatcher over `registry` and `store`.
    #[must_use]
    pub fn new(registry: impl Into<Arc<ToolRegistry>>, store: Arc<DataStore>) -> Self {
        Self {
            registry: registry.into(),
            store,
        }
    }

    /// The tool catalog.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Specs of every dispatchable function.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolSpec] {
        self.registry.list_tools()
    }

    /// Execute `name` with `arguments`, folding every failure into the result.
    #[instrument(skip(self, arguments), fields(function = %name))]
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Value {
        match self.try_dispatch(name, arguments).await {
            Ok(output) => {
                debug!("Function succeeded");
                success(output)
            }
            Err(err) => {
                if matches!(err, ToolError::UnknownFunction(_)) {
                    warn!(error = %err, "Model requested unknown function");
                } else {
                    debug!(error = %err, "Function failed");
                }
                failure(&err)
            }
        }
    }

    /// Execute `name` with `arguments`, returning the raw tool output.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownFunction`] for unregistered names,
    /// [`ToolError::InvalidArguments`] when validation fails, and whatever
    /// the tool itself reports.
    pub async fn try_dispatch(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let (Some(tool), Some(spec)) = (self.registry.get(name), self.registry.spec(name)) else {
            return Err(ToolError::UnknownFunction(name.to_owned()));
        };
        let args = validate_arguments(spec, arguments)?;
        tool.call_json(&self.store, args).await
    }
}

/// Wrap tool output as a success result. Object outputs are merged in after
/// the flag; anything else lands under `result`.
fn success(output: Value) -> Value {
    let mut result = Map::new();
    result.insert("success".into(), Value::Bool(true));
    match output {
        Value::Object(fields) => {
            result.extend(fields.into_iter().filter(|(k, _)| k != "success"));
        }
        Value::Null => {}
        other => {
            result.insert("result".into(), other);
        }
    }
    Value::Object(result)
}

fn failure(err: &ToolError) -> Value {
    json!({"success": false, "error": err.to_string()})
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_merges_object() {
        let out = success(json!({"tables": ["a"], "count": 1}));
        assert_eq!(out, json!({"success": true, "tables": ["a"], "count": 1}));
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "success");
    }

    #[test]
    fn test_success_wraps_scalars() {
        assert_eq!(success(json!(3)), json!({"success": true, "result": 3}));
        assert_eq!(success(Value::Null), json!({"success": true}));
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let store = Arc::new(DataStore::in_memory().unwrap());
        let dispatcher = Dispatcher::new(ToolRegistry::new(), store);
        let out = dispatcher.dispatch("drop_everything", &json!({})).await;
        assert_eq!(
            out,
            json!({"success": false, "error": "unknown function: drop_everything"})
        );
    }
}
