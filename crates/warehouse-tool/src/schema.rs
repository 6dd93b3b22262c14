use serde_json::{Map, Value};
use warehouse_core::{Error, Result};

/// Builder for the JSON schema describing a tool's parameters
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        type_: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            serde_json::json!({
                "type": type_.into(),
                "description": description.into(),
            }),
        );
        self
    }

    /// Adds a string property the caller must supply
    pub fn required_string(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        self.property(name.clone(), "string", description).required(name)
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn build(self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": Value::Object(self.properties),
            "required": self.required,
        })
    }
}

/// Reads a string parameter, failing the call when it is missing or not a string
pub fn required_str<'a>(params: &'a Value, name: &str) -> Result<&'a str> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::invalid_params(format!(
            "'{}' must be a string, got {}",
            name, other
        ))),
        None => Err(Error::invalid_params(format!("Missing '{}' parameter", name))),
    }
}
