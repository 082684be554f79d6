//! Plugin module lookup table.
//!
//! Holds the catalog of modules plugins make available to the canvas. The
//! layout core uses it for exactly one thing: seeding default config when a
//! module instance is first synced. Registration/unregistration notifies
//! subscribed observers so UI palettes can refresh.

use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use studio_model::ConfigMap;

/// A declared config field with its default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// What a plugin declares about one of its modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Editable config fields and their defaults.
    #[serde(default)]
    pub config_fields: BTreeMap<String, ConfigField>,
    /// Render props with defaults (legacy plugins declare these instead of
    /// config fields).
    #[serde(default)]
    pub props: BTreeMap<String, ConfigField>,
}

impl ModuleSpec {
    /// The display name shown on the canvas, falling back to `name`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.name.as_deref())
    }

    /// Collects declared defaults into a seed config. `config_fields` are
    /// applied first, then `props` fill gaps (never override).
    #[must_use]
    pub fn default_config(&self) -> ConfigMap {
        let mut config = ConfigMap::new();
        for (key, field) in &self.config_fields {
            if let Some(default) = &field.default {
                config.insert(key.clone(), default.clone());
            }
        }
        for (key, field) in &self.props {
            if let Some(default) = &field.default {
                config.entry(key.clone()).or_insert_with(|| default.clone());
            }
        }
        config
    }
}

/// Registry change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Registered { plugin_id: String, module_id: String },
    Unregistered { plugin_id: String, module_id: String },
}

type Observer = Box<dyn Fn(&RegistryEvent) + Send + Sync>;

/// The catalog of plugin modules, keyed by `(plugin_id, module_id)`.
///
/// Always passed in explicitly (constructor injection) rather than living at
/// process scope.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<(String, String), ModuleSpec>,
    observers: Arc<Mutex<Vec<Observer>>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module under `(plugin_id, module_id)`.
    pub fn register(
        &mut self,
        plugin_id: impl Into<String>,
        module_id: impl Into<String>,
        spec: ModuleSpec,
    ) -> RegistryResult<()> {
        let plugin_id = plugin_id.into();
        let module_id = module_id.into();
        let key = (plugin_id.clone(), module_id.clone());
        if self.modules.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                plugin_id,
                module_id,
            });
        }
        self.modules.insert(key, spec);
        info!(plugin_id = %plugin_id, module_id = %module_id, "Module registered");
        self.notify(&RegistryEvent::Registered {
            plugin_id,
            module_id,
        });
        Ok(())
    }

    /// Removes a module from the catalog.
    pub fn unregister(&mut self, plugin_id: &str, module_id: &str) -> RegistryResult<()> {
        let key = (plugin_id.to_string(), module_id.to_string());
        if self.modules.remove(&key).is_none() {
            return Err(RegistryError::NotFound {
                plugin_id: plugin_id.to_string(),
                module_id: module_id.to_string(),
            });
        }
        info!(plugin_id, module_id, "Module unregistered");
        self.notify(&RegistryEvent::Unregistered {
            plugin_id: plugin_id.to_string(),
            module_id: module_id.to_string(),
        });
        Ok(())
    }

    /// Looks up a module's declared spec. Returns `None` for unknown modules;
    /// callers degrade to placeholder definitions.
    #[must_use]
    pub fn get_module(&self, plugin_id: &str, module_id: &str) -> Option<&ModuleSpec> {
        self.modules
            .get(&(plugin_id.to_string(), module_id.to_string()))
    }

    /// All registered `(plugin_id, module_id)` keys.
    pub fn module_keys(&self) -> impl Iterator<Item = &(String, String)> {
        self.modules.keys()
    }

    /// Subscribes to registry changes.
    pub fn subscribe(&self, observer: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.observers
            .lock()
            .expect("observer list poisoned")
            .push(Box::new(observer));
    }

    fn notify(&self, event: &RegistryEvent) {
        let observers = self.observers.lock().expect("observer list poisoned");
        debug!(?event, observers = observers.len(), "Notifying registry observers");
        for observer in observers.iter() {
            observer(event);
        }
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spec_with_defaults() -> ModuleSpec {
        let mut spec = ModuleSpec::default();
        spec.display_name = Some("Line Chart".into());
        spec.config_fields.insert(
            "title".into(),
            ConfigField {
                default: Some(serde_json::json!("Untitled")),
                label: None,
            },
        );
        spec.props.insert(
            "title".into(),
            ConfigField {
                default: Some(serde_json::json!("prop-title")),
                label: None,
            },
        );
        spec.props.insert(
            "smooth".into(),
            ConfigField {
                default: Some(serde_json::json!(true)),
                label: None,
            },
        );
        spec
    }

    #[test]
    fn config_fields_take_precedence_over_props() {
        let config = spec_with_defaults().default_config();
        assert_eq!(config.get("title"), Some(&serde_json::json!("Untitled")));
        assert_eq!(config.get("smooth"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ModuleRegistry::new();
        registry
            .register("charts", "line", ModuleSpec::default())
            .unwrap();
        assert!(matches!(
            registry.register("charts", "line", ModuleSpec::default()),
            Err(RegistryError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn observers_see_register_and_unregister() {
        static FIRED: AtomicUsize = AtomicUsize::new(0);
        let mut registry = ModuleRegistry::new();
        registry.subscribe(|_event| {
            FIRED.fetch_add(1, Ordering::SeqCst);
        });

        registry
            .register("charts", "line", ModuleSpec::default())
            .unwrap();
        registry.unregister("charts", "line").unwrap();
        assert_eq!(FIRED.load(Ordering::SeqCst), 2);
    }
}
