//! Route table, middleware, and API documentation.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::handlers::{self, AppState};
use crate::models::{ErrorBody, ListingSchema, MessageBody, NewListingSchema};

/// Largest request body accepted.
pub const BODY_LIMIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "Listings API", description = "Create, list and delete property listings."),
    paths(
        handlers::health,
        handlers::list_properties,
        handlers::create_property,
        handlers::delete_property
    ),
    components(schemas(ListingSchema, NewListingSchema, ErrorBody, MessageBody)),
    tags(
        (name = "properties", description = "Property listings"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Swagger UI page loading the generated OpenAPI document.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Listings API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Builds the full application router around an injected state.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/properties",
            get(handlers::list_properties).post(handlers::create_property),
        )
        .route("/api/properties/:id", delete(handlers::delete_property))
        .layer(
            ServiceBuilder::new()
                // Json extractor limit, 2 MiB unless raised here
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/properties"));
        assert!(paths.contains_key("/api/properties/{id}"));
        assert!(paths["/api/properties"].get("post").is_some());
    }
}
