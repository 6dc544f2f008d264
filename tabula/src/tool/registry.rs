//! Ordered tool catalog.

use std::fmt;

use super::{BoxedTool, Tool, ToolDefinition, ToolDyn, ToolSpec};

/// Ordered, name-unique collection of tools.
///
/// Specs are captured when a tool is added, so listing the catalog is a pure
/// read with no side effects.
#[derive(Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    tools: Vec<BoxedTool>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from boxed tools, in order.
    #[must_use]
    pub fn from_tools(tools: impl IntoIterator<Item = BoxedTool>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.add_boxed(tool);
        }
        registry
    }

    /// Add a tool. A tool with the same name is replaced in place.
    pub fn add_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.add_boxed(Box::new(tool));
    }

    /// Add a tool, builder style.
    #[must_use]
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.add_tool(tool);
        self
    }

    /// Add a boxed tool. A tool with the same name is replaced in place.
    pub fn add_boxed(&mut self, tool: BoxedTool) {
        let spec = tool.spec();
        if let Some(idx) = self.position(&spec.name) {
            self.specs[idx] = spec;
            self.tools[idx] = tool;
        } else {
            self.specs.push(spec);
            self.tools.push(tool);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ToolDyn> {
        self.position(name).map(|idx| self.tools[idx].as_ref())
    }

    /// Look up a spec by name.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.position(name).map(|idx| &self.specs[idx])
    }

    /// Whether a tool named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All specs in registration order.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Tool names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    /// Definitions to advertise to the model.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs.iter().map(ToolSpec::definition).collect()
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;
    use crate::error::ToolError;
    use crate::store::DataStore;
    use crate::tool::ParameterSpec;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        const NAME: &'static str = "echo";
        type Args = EchoArgs;
        type Output = String;
        type Error = ToolError;

        fn description(&self) -> String {
            self.0.to_owned()
        }

        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![ParameterSpec::string("text", "Text to echo").required()]
        }

        async fn call(&self, _store: &DataStore, args: EchoArgs) -> Result<String, ToolError> {
            Ok(args.text)
        }
    }

    struct Noop;

    #[async_trait]
    impl Tool for Noop {
        const NAME: &'static str = "noop";
        type Args = serde_json::Value;
        type Output = ();
        type Error = ToolError;

        fn description(&self) -> String {
            "Does nothing".into()
        }

        async fn call(&self, _store: &DataStore, _args: serde_json::Value) -> Result<(), ToolError> {
            Ok(())
        }
    }

    #[test]
    fn test_order_and_replacement() {
        let mut registry = ToolRegistry::new().with_tool(Echo("first")).with_tool(Noop);
        assert_eq!(registry.names(), vec!["echo", "noop"]);

        registry.add_tool(Echo("second"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["echo", "noop"]);
        assert_eq!(registry.spec("echo").unwrap().description, "second");
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::new().with_tool(Noop);
        assert!(registry.contains("noop"));
        assert!(!registry.contains("echo"));
        assert!(registry.get("noop").is_some());
        assert_eq!(registry.definitions()[0].name, "noop");
    }

    #[tokio::test]
    async fn test_call_json() {
        let store = DataStore::in_memory().unwrap();
        let registry = ToolRegistry::new().with_tool(Echo("echo"));
        let out = registry
            .get("echo")
            .unwrap()
            .call_json(&store, serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }
}
