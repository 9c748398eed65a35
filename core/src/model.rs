//! Model types and their instances.
//!
//! # Overview
//! A `Model` describes an entity type: its name, primary key, optional
//! validator, type-level listeners and (once the REST plugin is installed) the
//! collection endpoint it persists to. An `Instance` is one record of that
//! type, holding an attribute map and a `removed` flag.
//!
//! # Design
//! - Models are built once through `ModelBuilder` and shared as `Arc<Model>`.
//!   Plugins are installed by the builder, so nothing is attached to a type
//!   after it exists.
//! - Type-level listeners sit behind a lock because any instance may notify
//!   them through its shared `Arc<Model>`. Instance listeners are owned by the
//!   instance.
//! - The primary key counts as present only when it is set and not `null`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ModelError};
use crate::events::{LifecycleEvent, Listener, Listeners};
use crate::http::Transport;
use crate::plugin::{Plugin, RestBinding};
use crate::template::PathTemplate;

/// Predicate deciding whether an instance may be saved.
pub type Validator = Arc<dyn Fn(&Instance) -> bool + Send + Sync>;

/// An entity type.
pub struct Model {
    name: String,
    primary_key: String,
    validator: Option<Validator>,
    listeners: RwLock<Listeners>,
    rest: Option<RestBinding>,
}

impl Model {
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            primary_key: "id".to_string(),
            validator: None,
            rest: None,
            plugins: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Base template of the REST collection, if persistence is installed.
    pub fn base(&self) -> Option<&PathTemplate> {
        self.rest.as_ref().map(|rest| rest.resource().base())
    }

    /// Transport used for this type's requests, if persistence is installed.
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.rest.as_ref().map(RestBinding::transport)
    }

    /// Construct an instance from a plain record.
    pub fn create(self: &Arc<Self>, attrs: Map<String, Value>) -> Instance {
        Instance {
            model: Arc::clone(self),
            attrs,
            removed: false,
            listeners: Listeners::default(),
        }
    }

    /// Construct an instance from a decoded response body.
    pub(crate) fn instance_from(self: &Arc<Self>, value: Value) -> Result<Instance, ModelError> {
        match value {
            Value::Object(attrs) => Ok(self.create(attrs)),
            other => Err(ModelError::Deserialization(format!(
                "expected a `{}` record, got {other}",
                self.name
            ))),
        }
    }

    /// Listen for `event` on every instance of this type.
    pub fn on<F>(&self, event: LifecycleEvent, listener: F)
    where
        F: Fn(&Instance) + Send + Sync + 'static,
    {
        self.registry().on(event, Arc::new(listener));
    }

    /// Like `on`, but the listener is dropped after it fires once.
    pub fn once<F>(&self, event: LifecycleEvent, listener: F)
    where
        F: Fn(&Instance) + Send + Sync + 'static,
    {
        self.registry().once(event, Arc::new(listener));
    }

    pub(crate) fn is_valid(&self, instance: &Instance) -> bool {
        self.validator.as_ref().map_or(true, |validate| validate(instance))
    }

    pub(crate) fn rest(&self) -> Result<&RestBinding, ModelError> {
        self.rest
            .as_ref()
            .ok_or_else(|| ModelError::NotInstalled(self.name.clone()))
    }

    fn take_listeners(&self, event: LifecycleEvent) -> Vec<Listener> {
        self.registry().take(event)
    }

    fn registry(&self) -> std::sync::RwLockWriteGuard<'_, Listeners> {
        // A panicking listener never runs under this lock, so the registry is
        // consistent even when poisoned.
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("primary_key", &self.primary_key)
            .field("base", &self.base().map(PathTemplate::as_str))
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for `Model`. Plugins are installed in registration order by
/// `build`.
pub struct ModelBuilder {
    name: String,
    primary_key: String,
    validator: Option<Validator>,
    rest: Option<RestBinding>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl ModelBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Instance) -> bool + Send + Sync + 'static,
    {
        self.set_validator(validator);
        self
    }

    pub fn set_validator<F>(&mut self, validator: F)
    where
        F: Fn(&Instance) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub(crate) fn set_rest(&mut self, rest: RestBinding) {
        self.rest = Some(rest);
    }

    pub fn build(mut self) -> Result<Arc<Model>, ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.primary_key.is_empty() {
            return Err(ConfigError::EmptyPrimaryKey);
        }

        let plugins = std::mem::take(&mut self.plugins);
        for plugin in &plugins {
            plugin.install(&mut self)?;
        }

        tracing::debug!(model = %self.name, plugins = plugins.len(), "model built");
        Ok(Arc::new(Model {
            name: self.name,
            primary_key: self.primary_key,
            validator: self.validator,
            listeners: RwLock::new(Listeners::default()),
            rest: self.rest,
        }))
    }
}

/// One record of a `Model`.
pub struct Instance {
    model: Arc<Model>,
    attrs: Map<String, Value>,
    removed: bool,
    listeners: Listeners,
}

impl Instance {
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn into_attrs(self) -> Map<String, Value> {
        self.attrs
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.attrs.remove(key)
    }

    /// True if `key` is set to something other than `null`.
    pub fn has(&self, key: &str) -> bool {
        self.attrs.get(key).is_some_and(|value| !value.is_null())
    }

    pub fn primary(&self) -> Option<&Value> {
        self.attrs
            .get(self.model.primary_key())
            .filter(|value| !value.is_null())
    }

    pub fn set_primary(&mut self, value: impl Into<Value>) {
        let key = self.model.primary_key().to_string();
        self.attrs.insert(key, value.into());
    }

    /// Set once a delete of this instance succeeded.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Listen for `event` on this instance only.
    pub fn on<F>(&mut self, event: LifecycleEvent, listener: F)
    where
        F: Fn(&Instance) + Send + Sync + 'static,
    {
        self.listeners.on(event, Arc::new(listener));
    }

    pub fn once<F>(&mut self, event: LifecycleEvent, listener: F)
    where
        F: Fn(&Instance) + Send + Sync + 'static,
    {
        self.listeners.once(event, Arc::new(listener));
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Notify type listeners, then instance listeners.
    pub(crate) fn notify(&mut self, event: LifecycleEvent) {
        tracing::trace!(model = %self.model.name(), %event, "lifecycle event");
        let shared = self.model.take_listeners(event);
        let own = self.listeners.take(event);
        let this: &Instance = self;
        for listener in shared.iter().chain(&own) {
            listener(this);
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model.name())
            .field("attrs", &self.attrs)
            .field("removed", &self.removed)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attrs.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn user() -> Arc<Model> {
        Model::builder("user").build().unwrap()
    }

    #[test]
    fn primary_key_defaults_to_id() {
        let model = user();
        assert_eq!(model.primary_key(), "id");
        let instance = model.create(record(json!({ "id": 3 })));
        assert_eq!(instance.primary(), Some(&json!(3)));
    }

    #[test]
    fn custom_primary_key() {
        let model = Model::builder("post").primary_key("slug").build().unwrap();
        let mut instance = model.create(Map::new());
        assert_eq!(instance.primary(), None);
        instance.set_primary("hello-world");
        assert_eq!(instance.get("slug"), Some(&json!("hello-world")));
    }

    #[test]
    fn null_counts_as_absent() {
        let instance = user().create(record(json!({ "id": null, "name": "x" })));
        assert!(!instance.has("id"));
        assert!(instance.has("name"));
        assert_eq!(instance.primary(), None);
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(Model::builder("").build().unwrap_err(), ConfigError::EmptyName);
        assert_eq!(
            Model::builder("user").primary_key("").build().unwrap_err(),
            ConfigError::EmptyPrimaryKey
        );
    }

    #[test]
    fn without_plugin_persistence_is_not_installed() {
        let model = user();
        assert!(model.base().is_none());
        assert!(model.transport().is_none());
        assert!(matches!(model.rest(), Err(ModelError::NotInstalled(name)) if name == "user"));
    }

    #[test]
    fn validator_defaults_to_valid() {
        let model = user();
        let instance = model.create(Map::new());
        assert!(model.is_valid(&instance));

        let strict = Model::builder("project")
            .validator(|project| project.has("user"))
            .build()
            .unwrap();
        assert!(!strict.is_valid(&strict.create(Map::new())));
        assert!(strict.is_valid(&strict.create(record(json!({ "user": 1 })))));
    }

    #[test]
    fn notify_reaches_type_listeners_before_instance_listeners() {
        let model = user();
        let log = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&log);
        model.on(LifecycleEvent::Save, move |_| seen.lock().unwrap().push("type"));

        let mut instance = model.create(Map::new());
        let seen = Arc::clone(&log);
        instance.on(LifecycleEvent::Save, move |_| seen.lock().unwrap().push("instance"));

        instance.notify(LifecycleEvent::Save);
        instance.notify(LifecycleEvent::Saving);
        assert_eq!(*log.lock().unwrap(), vec!["type", "instance"]);
    }

    #[test]
    fn type_listeners_see_every_instance() {
        let model = user();
        let names = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&names);
        model.on(LifecycleEvent::Remove, move |instance| {
            seen.lock().unwrap().push(instance.get("name").cloned());
        });

        model.create(record(json!({ "name": "one" }))).notify(LifecycleEvent::Remove);
        model.create(record(json!({ "name": "two" }))).notify(LifecycleEvent::Remove);

        assert_eq!(
            *names.lock().unwrap(),
            vec![Some(json!("one")), Some(json!("two"))]
        );
    }

    #[test]
    fn once_fires_a_single_time() {
        let model = user();
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        model.once(LifecycleEvent::Saving, move |_| *seen.lock().unwrap() += 1);

        let mut instance = model.create(Map::new());
        instance.notify(LifecycleEvent::Saving);
        instance.notify(LifecycleEvent::Saving);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn instance_serializes_as_its_attributes() {
        let instance = user().create(record(json!({ "id": 1, "name": "Name" })));
        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({ "id": 1, "name": "Name" })
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = user().instance_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ModelError::Deserialization(_)));
    }
}
