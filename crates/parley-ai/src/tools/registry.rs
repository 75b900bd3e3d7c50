//! Tool registry for managing available tools

use std::collections::HashMap;
use std::sync::Arc;

use crate::tools::traits::Tool;

/// Registry for managing available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a tool from Arc
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Render the catalog of tools for use inside generation prompts.
    ///
    /// Entries are sorted by name so prompt text is deterministic.
    pub fn tool_list(&self) -> String {
        let mut entries: Vec<String> = self
            .tools
            .values()
            .map(|tool| format!("{} ({})", tool.name(), tool.description()))
            .collect();
        entries.sort();
        entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::error::Result;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the argument back"
        }

        async fn run(&self, argument: &str) -> Result<Value> {
            Ok(Value::String(argument.to_string()))
        }
    }

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the argument"
        }

        async fn run(&self, argument: &str) -> Result<Value> {
            Ok(Value::String(argument.to_uppercase()))
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has("echo"));
        assert!(!registry.has("unknown"));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn tool_list_is_sorted_and_descriptive() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);
        registry.register(EchoTool);

        assert_eq!(
            registry.tool_list(),
            "echo (Echo the argument back), upper (Uppercase the argument)"
        );
    }
}
