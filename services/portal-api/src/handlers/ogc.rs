//! OGC dispatch: `/api/{product}/{wms|wfs|wcs}`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use ogc_common::{OgcError, OgcResult, ServiceType};
use ogc_protocol::RawQuery;
use ogc_service::{OgcRequest, ServiceResponse};
use tracing::debug;

use crate::metrics::record_request;
use crate::state::AppState;

/// GET /api/:product/:service
pub async fn ogc_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((product, service)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let query = RawQuery::from_pairs(params);
    let verb = query.get("request").unwrap_or_default().to_string();

    let response = match resolve_service(&service, &query) {
        Ok(service_type) => {
            let request = OgcRequest::new(base_url(&state, &headers), query);
            state.registry.dispatch(&product, service_type, &request).await
        }
        Err(err) => ServiceResponse::from_error(&err),
    };

    debug!(
        product = %product,
        service = %service,
        request = %verb,
        status = response.status,
        "OGC request dispatched"
    );
    record_request(
        &product.to_ascii_uppercase(),
        &service.to_ascii_uppercase(),
        &verb,
        response.status,
        started.elapsed(),
    );
    into_http(response)
}

/// Protocol named by the path, cross-checked against a `SERVICE` parameter.
pub fn resolve_service(segment: &str, query: &RawQuery) -> OgcResult<ServiceType> {
    let service_type = ServiceType::from_str(segment)
        .map_err(|_| OgcError::invalid("service", format!("'{}' is not one of wms, wfs, wcs", segment)))?;
    if let Some(declared) = query.get("service") {
        if !declared.eq_ignore_ascii_case(service_type.as_str()) {
            return Err(OgcError::invalid(
                "service",
                format!("'{}' does not match the {} endpoint", declared, service_type),
            ));
        }
    }
    Ok(service_type)
}

/// Base for capability self-references.
pub fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.clone();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

pub fn into_http(response: ServiceResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = response.content_type.clone();
    (status, [(header::CONTENT_TYPE, content_type)], response.into_bytes()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_is_case_insensitive() {
        let query = RawQuery::default();
        assert_eq!(resolve_service("wms", &query).unwrap(), ServiceType::Wms);
        assert_eq!(resolve_service("WCS", &query).unwrap(), ServiceType::Wcs);
        assert!(resolve_service("wmts", &query).is_err());
    }

    #[test]
    fn service_parameter_must_agree_with_path() {
        let agreeing = RawQuery::from_pairs([("SERVICE", "wfs")]);
        assert!(resolve_service("wfs", &agreeing).is_ok());

        let disagreeing = RawQuery::from_pairs([("service", "WMS")]);
        let err = resolve_service("wfs", &disagreeing).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn error_envelope_keeps_status() {
        let response = into_http(ServiceResponse::from_error(&OgcError::ServiceNotFound("S999".into())));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
