//! Function-definition registry
//!
//! Maps identifiers to functions defined in the local project. An identifier
//! may be a logical ID, the physical function name, or the full path.

use dashmap::DashMap;
use serde::Deserialize;

/// A function defined in the local project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionDefinition {
    #[serde(default)]
    pub logical_id: String,
    pub function_name: String,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub code_uri: Option<String>,
}

impl FunctionDefinition {
    pub fn new(logical_id: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            function_name: function_name.into(),
            runtime: None,
            handler: None,
            code_uri: None,
        }
    }

    /// Path of the function within the project. Nested stacks are not modelled,
    /// so this is the logical ID.
    pub fn full_path(&self) -> &str {
        &self.logical_id
    }
}

/// Looks up local function definitions. Lookups must be cheap and side-effect free.
pub trait FunctionProvider: Send + Sync {
    fn get(&self, identifier: &str) -> Option<FunctionDefinition>;
}

/// In-memory registry keyed by logical ID
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: DashMap<String, FunctionDefinition>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = FunctionDefinition>) -> Self {
        let registry = Self::new();
        for definition in definitions {
            registry.insert(definition);
        }
        registry
    }

    pub fn insert(&self, definition: FunctionDefinition) {
        self.functions
            .insert(definition.logical_id.clone(), definition);
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionProvider for FunctionRegistry {
    fn get(&self, identifier: &str) -> Option<FunctionDefinition> {
        if let Some(definition) = self.functions.get(identifier) {
            return Some(definition.clone());
        }

        // The full path is the logical ID, so the keyed lookup above covers it
        self.functions
            .iter()
            .find(|entry| entry.function_name == identifier)
            .map(|entry| entry.value().clone())
    }
}
