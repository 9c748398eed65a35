//! Plugin installation and the REST binding it produces.
//!
//! # Design
//! `ModelBuilder::plugin` is the extension point: a plugin receives the
//! builder while the model is being built and records what it contributes.
//! `RestPlugin` contributes a `RestBinding`, which is everything the
//! collection operations and the instance lifecycle need to talk to the
//! server: the request builder for the base template and the transport.
//!
//! A base path is required. The type name is never pluralized into one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ConfigError, ModelError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::model::ModelBuilder;
use crate::resource::Resource;
use crate::response;
use crate::template::has_placeholder;

/// Something that extends a model type while it is built.
pub trait Plugin {
    fn install(&self, builder: &mut ModelBuilder) -> Result<(), ConfigError>;
}

/// Installs REST persistence against a base path template.
#[derive(Clone)]
pub struct RestPlugin {
    base: Option<String>,
    transport: Arc<dyn Transport>,
}

/// REST persistence for the collection at `base`, e.g. `/users` or
/// `/users/:user/projects`.
pub fn http(base: &str, transport: Arc<dyn Transport>) -> RestPlugin {
    RestPlugin::new(transport).base(base)
}

impl RestPlugin {
    /// A plugin with no base path yet. Installing it as is fails with
    /// `ConfigError::MissingBase`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            base: None,
            transport,
        }
    }

    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }
}

impl Plugin for RestPlugin {
    fn install(&self, builder: &mut ModelBuilder) -> Result<(), ConfigError> {
        let base = self
            .base
            .as_deref()
            .filter(|base| !base.is_empty())
            .ok_or_else(|| ConfigError::MissingBase(builder.name().to_string()))?;

        debug!(model = %builder.name(), base, "installing REST persistence");
        builder.set_rest(RestBinding {
            resource: Resource::new(base),
            transport: Arc::clone(&self.transport),
        });
        Ok(())
    }
}

/// Request builder plus transport for one model type.
pub(crate) struct RestBinding {
    resource: Resource,
    transport: Arc<dyn Transport>,
}

impl RestBinding {
    pub(crate) fn resource(&self) -> &Resource {
        &self.resource
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// One round-trip, translated: non-2xx responses come back as errors.
    pub(crate) fn send(&self, request: HttpRequest) -> Result<HttpResponse, ModelError> {
        if has_placeholder(&request.path) {
            warn!(path = %request.path, "sending request with unresolved placeholder");
        }
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "received response"
        );
        response::check(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use crate::model::Model;

    #[test]
    fn http_installs_base_and_transport() {
        let transport = FakeTransport::new();
        let model = Model::builder("user")
            .plugin(http("/users", transport.clone()))
            .build()
            .unwrap();
        assert_eq!(model.base().map(|b| b.as_str()), Some("/users"));
        assert!(model.transport().is_some());
    }

    #[test]
    fn missing_base_fails_installation() {
        let err = Model::builder("user")
            .plugin(RestPlugin::new(FakeTransport::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingBase("user".to_string()));
    }

    #[test]
    fn empty_base_counts_as_missing() {
        let err = Model::builder("user")
            .plugin(http("", FakeTransport::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingBase("user".to_string()));
    }

    #[test]
    fn send_translates_error_status() {
        let transport = FakeTransport::new();
        transport.respond(500, "");
        let binding = RestBinding {
            resource: Resource::new("/users"),
            transport: transport.clone(),
        };
        let err = binding.send(binding.resource().build_list(&[])).unwrap_err();
        assert_eq!(err.to_string(), "got a 500 response");
        assert_eq!(transport.requests().len(), 1);
    }
}
