//! HTTP transport types and the `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and interprets `HttpResponse` values; moving bytes over the wire is
//! the job of a `Transport`. A transport reports a non-2xx status as an
//! ordinary response, and only fails when no response was produced at all.
//!
//! Request paths are origin-relative (`/users/0`). The transport owns the
//! origin, so model base templates never contain a scheme or port.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes requests on behalf of a model type.
///
/// One call is one round-trip. Implementations must not retry, and must
/// return 4xx/5xx responses as `Ok` so the caller can translate them.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use super::{HttpMethod, HttpRequest, HttpResponse, Transport};
    use crate::error::TransportError;

    /// Blocking transport backed by a `ureq` agent.
    #[derive(Clone)]
    pub struct UreqTransport {
        origin: String,
        agent: ureq::Agent,
    }

    impl std::fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("UreqTransport")
                .field("origin", &self.origin)
                .finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        /// Create a transport that sends every request to `origin`
        /// (e.g. `http://127.0.0.1:4200`).
        pub fn new(origin: &str) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self::with_agent(origin, agent)
        }

        /// Use a preconfigured agent. The agent must have
        /// `http_status_as_error` disabled.
        pub fn with_agent(origin: &str, agent: ureq::Agent) -> Self {
            Self {
                origin: origin.trim_end_matches('/').to_string(),
                agent,
            }
        }

        pub fn origin(&self) -> &str {
            &self.origin
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = format!("{}{}", self.origin, request.path);

            let result = match request.method {
                HttpMethod::Get | HttpMethod::Delete => {
                    let mut builder = if request.method == HttpMethod::Get {
                        self.agent.get(&url)
                    } else {
                        self.agent.delete(&url)
                    };
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post | HttpMethod::Put => {
                    let mut builder = if request.method == HttpMethod::Post {
                        self.agent.post(&url)
                    } else {
                        self.agent.put(&url)
                    };
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    match &request.body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

}
