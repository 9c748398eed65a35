//! Translation of transport responses into model results.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ModelError;
use crate::http::HttpResponse;

/// Pass a 2xx response through; turn anything else into `ModelError::Http`.
pub fn check(response: HttpResponse) -> Result<HttpResponse, ModelError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ModelError::Http {
        status: response.status,
        body: response.body,
    })
}

/// Decode a body that must be present.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ModelError> {
    serde_json::from_str(&response.body).map_err(|e| ModelError::Deserialization(e.to_string()))
}

/// Decode a body that may be empty, as after a create or delete.
pub fn decode_optional(response: &HttpResponse) -> Result<Option<Value>, ModelError> {
    if response.body.trim().is_empty() {
        return Ok(None);
    }
    decode(response).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn non_2xx_becomes_http_error() {
        let err = check(response(404, "")).unwrap_err();
        assert!(matches!(err, ModelError::Http { status: 404, .. }));
        assert_eq!(err.to_string(), "got a 404 response");
    }

    #[test]
    fn server_error_keeps_body() {
        let err = check(response(500, "boom")).unwrap_err();
        match err {
            ModelError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn success_passes_body_through_unmodified() {
        let ok = check(response(201, r#"{"id":0,"name":"Name"}"#)).unwrap();
        let body: Value = decode(&ok).unwrap();
        assert_eq!(body, json!({ "id": 0, "name": "Name" }));
    }

    #[test]
    fn empty_body_decodes_to_none() {
        let ok = check(response(204, "")).unwrap();
        assert_eq!(decode_optional(&ok).unwrap(), None);
    }

    #[test]
    fn bad_json_is_a_deserialization_error() {
        let ok = check(response(200, "not json")).unwrap();
        let err = decode::<Value>(&ok).unwrap_err();
        assert!(matches!(err, ModelError::Deserialization(_)));
    }
}
