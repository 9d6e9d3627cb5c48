use crate::http::errors::RequestError;
use crate::http::input::parse_request_data;
use crate::http::{AppState, HealthResponse, PresentationResponse};
use crate::services::document::RequestOrigin;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::time::SystemTime;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/presentation", post(presentation_handler))
        .route("/volt-consulting/presentation", post(presentation_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = SystemTime::now()
        .duration_since(state.start_time)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let response = HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        timestamp: Utc::now(),
    };

    (StatusCode::OK, Json(response))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn request_origin(headers: &HeaderMap, default_scheme: &str) -> RequestOrigin {
    let scheme = header_str(headers, "x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| v == "http" || v == "https")
        .unwrap_or_else(|| default_scheme.to_string());
    let host = header_str(headers, "x-forwarded-host")
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    RequestOrigin { scheme, host }
}

async fn presentation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, RequestError> {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("presentation", request_id = %request_id);

    async move {
        let origin = request_origin(&headers, &state.config.public_scheme);
        tracing::info!(host = %origin.host, bytes = body.len(), "Presentation requested");

        let result = match parse_request_data(header_str(&headers, header::CONTENT_TYPE.as_str()), &body) {
            Ok(data) => state.producer.produce(&data, &origin).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(stored) => {
                tracing::info!(url = %stored.url, "Presentation ready");
                Ok((StatusCode::OK, Json(PresentationResponse::from(stored))))
            }
            Err(error) => {
                if error.status_code().is_server_error() {
                    tracing::error!(code = ?error.code(), "Presentation failed: {}", error);
                } else {
                    tracing::warn!(code = ?error.code(), "Presentation rejected: {}", error);
                }
                Err(RequestError { request_id, error })
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("volt-crm.caansoft.com"));
        let origin = request_origin(&headers, "http");
        assert_eq!(origin.scheme, "http");
        assert_eq!(origin.host, "volt-crm.caansoft.com");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("crm.volt-consulting.com"));
        let origin = request_origin(&headers, "http");
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "crm.volt-consulting.com");

        assert_eq!(request_origin(&HeaderMap::new(), "http").host, "localhost");
    }
}
