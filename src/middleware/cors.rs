use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower_http::cors::{Any, CorsLayer};

/// CORS for the configured front-end origin, with credentials. An origin
/// that is not a valid header value falls back to allowing any origin
/// without credentials.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(methods)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!("FRONTEND_URL '{}' is not a valid origin, allowing any origin", origin);
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        }
    }
}
