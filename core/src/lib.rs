//! REST persistence for in-memory models.
//!
//! # Overview
//! A `Model` is an entity type; an `Instance` is one of its records. The
//! `http` plugin binds a model type to a REST collection such as `/users` or
//! `/users/:user/projects` and enables:
//!
//! - type-level `get`, `get_all`, `remove`, `remove_all`
//! - instance-level `url`, `is_new`, `save`, `update`, `remove`
//!
//! Instance operations notify `saving`/`save` and `removing`/`remove`
//! listeners on the type and on the instance around each request.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   a `Transport` performs the round-trip. `UreqTransport` is the default
//!   blocking implementation (feature `ureq`).
//! - `Resource` builds requests, `response` translates results; the model
//!   operations only glue the two together around one transport call.
//! - Path arguments for templated bases are passed explicitly as `&[Value]`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use model_http::{http, Model, UreqTransport};
//! use serde_json::{json, Map};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(UreqTransport::new("http://127.0.0.1:4200"));
//! let users = Model::builder("user")
//!     .plugin(http("/users", transport))
//!     .build()?;
//!
//! let mut attrs = Map::new();
//! attrs.insert("name".to_string(), json!("Name"));
//! let mut user = users.create(attrs);
//! user.save()?;
//! let fetched = users.get(&[], user.primary().cloned().unwrap_or_default())?;
//! assert_eq!(fetched.attrs(), user.attrs());
//! # Ok(())
//! # }
//! ```

mod collection;
pub mod error;
pub mod events;
pub mod http;
mod lifecycle;
pub mod model;
pub mod plugin;
pub mod resource;
pub mod response;
pub mod template;

#[cfg(test)]
mod fake;

pub use error::{ConfigError, ModelError, TransportError};
pub use events::LifecycleEvent;
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use model::{Instance, Model, ModelBuilder};
pub use plugin::{http, Plugin, RestPlugin};
pub use resource::Resource;
pub use template::PathTemplate;
