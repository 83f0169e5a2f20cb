//! HTTP-shaped responses produced by the protocol handlers.

use bytes::Bytes;
use ogc_common::OgcError;
use serde_json::{json, Value};

pub const CONTENT_TYPE_XML: &str = "text/xml";
pub const CONTENT_TYPE_GML: &str = "application/gml+xml";
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Xml(String),
    Json(Value),
    Binary(Bytes),
}

/// `{status, content_type, body}` handed to the outer router.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: String,
    pub body: ResponseBody,
}

impl ServiceResponse {
    pub fn xml(document: String) -> Self {
        Self::ok(CONTENT_TYPE_XML, ResponseBody::Xml(document))
    }

    pub fn gml(document: String) -> Self {
        Self::ok(CONTENT_TYPE_GML, ResponseBody::Xml(document))
    }

    pub fn json(value: Value) -> Self {
        Self::ok(CONTENT_TYPE_JSON, ResponseBody::Json(value))
    }

    pub fn binary(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::ok(content_type, ResponseBody::Binary(data.into()))
    }

    fn ok(content_type: impl Into<String>, body: ResponseBody) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body,
        }
    }

    /// JSON error envelope: `{"error": {"code": N, "message": "..."}}`.
    pub fn from_error(err: &OgcError) -> Self {
        Self {
            status: err.status_code(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            body: ResponseBody::Json(json!({
                "error": {
                    "code": err.status_code(),
                    "message": err.to_string(),
                    "exceptionCode": err.exception_code(),
                }
            })),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error message when this is an error envelope.
    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Json(v) if !self.is_success() => v
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// Serialized body bytes.
    pub fn body_bytes(&self) -> Bytes {
        match &self.body {
            ResponseBody::Xml(text) => Bytes::from(text.clone()),
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Binary(bytes) => bytes.clone(),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self.body {
            ResponseBody::Xml(text) => Bytes::from(text),
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Binary(bytes) => bytes,
        }
    }
}

impl From<OgcError> for ServiceResponse {
    fn from(err: OgcError) -> Self {
        Self::from_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogc_common::ServiceType;

    #[test]
    fn error_envelope_carries_status_and_message() {
        let response = ServiceResponse::from_error(&OgcError::MissingRequiredParameters(vec![
            "bbox".into(),
            "width".into(),
        ]));
        assert_eq!(response.status, 400);
        assert_eq!(response.content_type, "application/json");
        assert_eq!(
            response.error_message(),
            Some("Missing required parameters: bbox, width")
        );
        let ResponseBody::Json(value) = &response.body else {
            panic!("expected JSON body");
        };
        assert_eq!(value["error"]["code"], 400);
    }

    #[test]
    fn missing_capability_is_404() {
        let response: ServiceResponse = OgcError::MissingCapability {
            product: "S102".into(),
            service: ServiceType::Wfs,
        }
        .into();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[test]
    fn success_has_no_error_message() {
        let response = ServiceResponse::xml("<a/>".into());
        assert!(response.is_success());
        assert_eq!(response.error_message(), None);
        assert_eq!(response.into_bytes(), Bytes::from_static(b"<a/>"));
    }
}
