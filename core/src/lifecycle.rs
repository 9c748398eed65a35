//! Instance-level persistence: url, isNew, save, update, remove.
//!
//! # Design
//! An instance is New until its primary key is set, Persisted afterwards, and
//! Removed once a delete succeeded. `save` creates New instances and updates
//! Persisted ones.
//!
//! Each step notifies `Saving`/`Removing` before the request is sent and
//! `Save`/`Remove` after a successful response. State changes (primary key,
//! `removed` flag) are applied before the post-event fires. A failed request
//! changes nothing and fires no post-event.
//!
//! The methods take `&mut self`, so two calls can never overlap on the same
//! instance.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ModelError;
use crate::events::LifecycleEvent;
use crate::model::Instance;
use crate::response;
use crate::template::render_value;

impl Instance {
    /// Member URL: the base resolved from this instance's attributes, then
    /// `/<primary key>`. A New instance keeps `:<primary key>` as the last
    /// segment.
    pub fn url(&self) -> String {
        let model = self.model();
        let collection = model
            .base()
            .map(|base| base.resolve_named(self.attrs()))
            .unwrap_or_default();
        let id = match self.primary() {
            Some(id) => render_value(id),
            None => format!(":{}", model.primary_key()),
        };
        format!("{collection}/{id}")
    }

    /// True while the primary key is absent.
    pub fn is_new(&self) -> bool {
        !self.has(self.model().primary_key())
    }

    /// Create the record if New, otherwise update it.
    pub fn save(&mut self) -> Result<(), ModelError> {
        if !self.is_new() {
            return self.update();
        }
        self.validate()?;

        let model = Arc::clone(self.model());
        let rest = model.rest()?;
        self.notify(LifecycleEvent::Saving);

        let request = rest.resource().build_create(self.attrs())?;
        let response = rest.send(request)?;
        // The create already succeeded; a body that is not a record only
        // means no primary key comes back.
        let body = response::decode_optional(&response).unwrap_or_else(|err| {
            tracing::debug!(model = %model.name(), %err, "create response carries no record");
            None
        });
        if let Some(Value::Object(body)) = body {
            if let Some(id) = body.get(model.primary_key()).filter(|id| !id.is_null()) {
                self.set_primary(id.clone());
            }
        }

        self.notify(LifecycleEvent::Save);
        Ok(())
    }

    /// `PUT` the attributes to `url()`.
    pub fn update(&mut self) -> Result<(), ModelError> {
        self.validate()?;

        let model = Arc::clone(self.model());
        let rest = model.rest()?;
        self.notify(LifecycleEvent::Saving);

        let request = rest.resource().build_update(self.url(), self.attrs())?;
        rest.send(request)?;

        self.notify(LifecycleEvent::Save);
        Ok(())
    }

    /// `DELETE url()` and mark the instance removed.
    pub fn remove(&mut self) -> Result<(), ModelError> {
        if self.is_new() {
            return Err(ModelError::NotSaved);
        }

        let model = Arc::clone(self.model());
        let rest = model.rest()?;
        self.notify(LifecycleEvent::Removing);

        let request = rest.resource().build_delete(self.url());
        rest.send(request)?;

        self.mark_removed();
        self.notify(LifecycleEvent::Remove);
        Ok(())
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.model().is_valid(self) {
            Ok(())
        } else {
            Err(ModelError::Validation)
        }
    }
}
