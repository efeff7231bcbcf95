//! Engine configuration

use crate::history::HistoryConfig;
use crate::key_generator::DEFAULT_SEED;
use crate::schema::ComponentRegistry;
use crate::state::PlatformInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Prefix of generated node keys
    #[serde(default = "default_key_seed")]
    pub key_seed: String,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Extra component schemas, layered over the builtin palette
    #[serde(default, skip_serializing_if = "ComponentRegistry::is_empty")]
    pub components: ComponentRegistry,

    /// Start from an empty registry instead of the builtin palette
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_builtin_components: bool,

    #[serde(default)]
    pub platform: PlatformInfo,
}

fn default_key_seed() -> String {
    DEFAULT_SEED.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_seed: default_key_seed(),
            history: HistoryConfig::default(),
            components: ComponentRegistry::default(),
            skip_builtin_components: false,
            platform: PlatformInfo::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_key_seed(mut self, seed: impl Into<String>) -> Self {
        self.key_seed = seed.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.history.max_depth = max_depth;
        self
    }

    /// Effective component registry
    pub fn registry(&self) -> ComponentRegistry {
        let mut registry = if self.skip_builtin_components {
            ComponentRegistry::new()
        } else {
            ComponentRegistry::builtin()
        };
        registry.extend(&self.components);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: EngineConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.history.max_depth, 100);
        assert_eq!(config.key_seed, DEFAULT_SEED);
    }

    #[test]
    fn test_custom_components_extend_builtin() {
        let config: EngineConfig = serde_json::from_value(json!({
            "keySeed": "node",
            "history": { "maxDepth": 10 },
            "components": {
                "Card": { "container": { "kind": "list" } }
            }
        }))
        .unwrap();

        let registry = config.registry();
        assert!(registry.get("Card").is_some());
        assert!(registry.get("Button").is_some());
        assert_eq!(config.history.max_depth, 10);
    }

    #[test]
    fn test_skip_builtin_components() {
        let config: EngineConfig = serde_json::from_value(json!({
            "skipBuiltinComponents": true,
            "components": { "Card": {} }
        }))
        .unwrap();

        let registry = config.registry();
        assert_eq!(registry.len(), 1);
    }
}
