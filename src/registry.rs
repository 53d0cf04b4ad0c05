use std::{collections::HashMap, sync::Arc};

use schemars::{JsonSchema, generate::SchemaSettings};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{DispatchError, RegistryError, ToolError},
    model::{CallToolResult, JsonObject},
};

type ErasedHandler = Box<dyn Fn(Value) -> Result<CallToolResult, DispatchError> + Send + Sync>;

/// A single registered tool: name, generated input schema, and the erased
/// validate-then-invoke closure.
pub struct RegisteredTool {
    pub name: &'static str,
    pub input_schema: Arc<JsonObject>,
    handler: ErasedHandler,
}

impl RegisteredTool {
    /// Validates `arguments` against the tool's parameter type and, only if
    /// that succeeds, runs the handler. Validation failures never reach the
    /// handler body.
    pub fn call(&self, arguments: Value) -> Result<CallToolResult, DispatchError> {
        (self.handler)(arguments)
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.name)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// The immutable catalog of invocable tools. Built once at startup, then
/// moved behind an `Arc`; no runtime re-registration.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<RegisteredTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, capturing the JSON schema of its
    /// parameter type. Duplicate names are a startup error, never a silent
    /// replacement.
    pub fn register<P, F>(&mut self, name: &'static str, handler: F) -> Result<(), RegistryError>
    where
        P: DeserializeOwned + JsonSchema,
        F: Fn(P) -> Result<CallToolResult, ToolError> + Send + Sync + 'static,
    {
        if self.tools.contains_key(name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        let input_schema = Arc::new(schema_for_type::<P>());
        let erased: ErasedHandler = Box::new(move |raw| {
            let params: P = serde_path_to_error::deserialize(raw).map_err(|e| {
                DispatchError::InvalidArguments {
                    tool: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            handler(params).map_err(|e| DispatchError::HandlerFailure {
                tool: name.to_string(),
                reason: e.to_string(),
            })
        });
        self.tools.insert(
            name,
            Arc::new(RegisteredTool {
                name,
                input_schema,
                handler: erased,
            }),
        );
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<RegisteredTool>, DispatchError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Generates a JSON schema object for a parameter type.
fn schema_for_type<T: JsonSchema>() -> JsonObject {
    let generator = SchemaSettings::draft2020_12().into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");
    match object {
        Value::Object(object) => object,
        _ => panic!("schema serialization produced a non-object value: {object:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoParams {
        text: String,
    }

    fn echo(params: EchoParams) -> Result<CallToolResult, ToolError> {
        Ok(CallToolResult::text(params.text))
    }

    #[test]
    fn resolve_and_call_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", echo).unwrap();

        let tool = registry.resolve("echo").unwrap();
        let result = tool.call(json!({"text": "hi"})).unwrap();
        assert_eq!(result, CallToolResult::text("hi"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", echo).unwrap();
        let error = registry.register("echo", echo).unwrap_err();
        assert!(matches!(error, RegistryError::DuplicateTool("echo")));
        // the original registration is untouched
        assert!(registry.resolve("echo").is_ok());
    }

    #[test]
    fn unknown_tool_is_signalled() {
        let registry = ToolRegistry::new();
        let error = registry.resolve("frobnicate").unwrap_err();
        assert!(matches!(error, DispatchError::UnknownTool(name) if name == "frobnicate"));
    }

    #[test]
    fn missing_field_never_runs_the_handler() {
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = invoked.clone();

        let mut registry = ToolRegistry::new();
        registry
            .register("echo", move |params: EchoParams| {
                flag.store(true, Ordering::SeqCst);
                Ok(CallToolResult::text(params.text))
            })
            .unwrap();

        let tool = registry.resolve("echo").unwrap();
        let error = tool.call(json!({})).unwrap_err();
        assert!(!invoked.load(Ordering::SeqCst));
        match error {
            DispatchError::InvalidArguments { tool, reason } => {
                assert_eq!(tool, "echo");
                assert!(reason.contains("text"), "unexpected reason: {reason}");
            }
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_invalid_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", echo).unwrap();

        let tool = registry.resolve("echo").unwrap();
        let error = tool.call(json!({"text": 42})).unwrap_err();
        match error {
            DispatchError::InvalidArguments { reason, .. } => {
                assert!(reason.contains("text"), "unexpected reason: {reason}");
            }
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn handler_error_becomes_handler_failure() {
        let mut registry = ToolRegistry::new();
        registry
            .register("explode", |_: EchoParams| -> Result<CallToolResult, ToolError> {
                Err(ToolError::new("boom"))
            })
            .unwrap();

        let tool = registry.resolve("explode").unwrap();
        let error = tool.call(json!({"text": "x"})).unwrap_err();
        assert!(matches!(error, DispatchError::HandlerFailure { reason, .. } if reason == "boom"));
    }

    #[test]
    fn input_schema_describes_parameters() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", echo).unwrap();

        let tool = registry.resolve("echo").unwrap();
        let properties = tool
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
            .unwrap();
        assert!(properties.contains_key("text"));
    }
}
