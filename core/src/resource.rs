//! Stateless request builder for a model's REST collection.
//!
//! # Design
//! `Resource` holds only the base template. Each verb has a `build_*` method
//! that produces an `HttpRequest`; nothing here touches the network. Model
//! operations pair a `build_*` call with a transport round-trip and the
//! response translator.
//!
//! Collection paths come from the base template resolved against explicit
//! path arguments, member paths append `/<id>`.

use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::http::{HttpMethod, HttpRequest};
use crate::template::{render_value, PathTemplate};

/// Request builder for one collection endpoint.
#[derive(Debug, Clone)]
pub struct Resource {
    base: PathTemplate,
}

impl Resource {
    pub fn new(base: &str) -> Self {
        Self {
            base: PathTemplate::new(base.trim_end_matches('/')),
        }
    }

    pub fn base(&self) -> &PathTemplate {
        &self.base
    }

    /// Collection path with placeholders filled positionally.
    pub fn collection_path(&self, path_args: &[Value]) -> String {
        non_empty(self.base.resolve_ordered(path_args))
    }

    /// Collection path with placeholders filled from an attribute map.
    pub fn collection_path_for(&self, attrs: &Map<String, Value>) -> String {
        non_empty(self.base.resolve_named(attrs))
    }

    /// Collection path plus `/<id>`. Path values and the id are spliced in
    /// verbatim, so they must already be URL-safe.
    pub fn member_path(&self, path_args: &[Value], id: &Value) -> String {
        format!("{}/{}", self.base.resolve_ordered(path_args), render_value(id))
    }

    pub fn build_list(&self, path_args: &[Value]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_path(path_args),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, path_args: &[Value], id: &Value) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.member_path(path_args, id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// POST the attributes to the collection resolved from those same
    /// attributes.
    pub fn build_create(&self, attrs: &Map<String, Value>) -> Result<HttpRequest, ModelError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_path_for(attrs),
            headers: json_headers(),
            body: Some(to_body(attrs)?),
        })
    }

    /// PUT the attributes to an already resolved member URL.
    pub fn build_update(&self, url: String, attrs: &Map<String, Value>) -> Result<HttpRequest, ModelError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: url,
            headers: json_headers(),
            body: Some(to_body(attrs)?),
        })
    }

    pub fn build_delete(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_delete_all(&self, path_args: &[Value]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.collection_path(path_args),
            headers: Vec::new(),
            body: None,
        }
    }
}

fn non_empty(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_body(attrs: &Map<String, Value>) -> Result<String, ModelError> {
    serde_json::to_string(attrs).map_err(|e| ModelError::Serialization(e.to_string()))
}
