use crate::errors::{AppError, ResultExt};
use crate::models::{ErrorBody, Listing, ListingSchema, MessageBody, NewListing, NewListingSchema};
use crate::store::RecordStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const MISSING_FIELDS: &str = "Missing required property fields.";
pub const BODY_TOO_LARGE: &str = "Request body too large.";
pub const NOT_FOUND: &str = "Property not found.";
pub const FETCH_FAILED: &str = "Failed to fetch properties.";
pub const CREATE_FAILED: &str = "Failed to add property.";
pub const DELETE_FAILED: &str = "Failed to delete property.";
pub const DELETED: &str = "Property deleted successfully.";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where listings live.
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "store": state.store.backend(),
        })),
    )
}

/// GET /api/properties
///
/// Every listing in the store, each with its id.
#[utoipa::path(
    get,
    path = "/api/properties",
    responses(
        (status = 200, description = "All listings", body = [ListingSchema]),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state.store.list().await.or_fail(FETCH_FAILED)?;
    tracing::info!("GET /api/properties - {} listings", listings.len());
    Ok(Json(listings))
}

/// POST /api/properties
///
/// Validates `name`, `price` and `location`, defaults `image`, and stores the rest verbatim.
#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = NewListingSchema,
    responses(
        (status = 201, description = "Listing created", body = ListingSchema),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let Json(body) = body.map_err(|rejection| match rejection {
        JsonRejection::BytesRejection(err) => {
            tracing::info!("POST /api/properties rejected - {}", err.body_text());
            AppError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
        }
        other => {
            tracing::debug!("Unreadable listing body: {}", other.body_text());
            AppError::BadRequest(MISSING_FIELDS.to_string())
        }
    })?;

    let new_listing = NewListing::from_body(body).map_err(|missing| {
        tracing::info!("POST /api/properties rejected - {}", missing);
        AppError::BadRequest(MISSING_FIELDS.to_string())
    })?;

    let listing = state
        .store
        .insert(new_listing.into_document())
        .await
        .or_fail(CREATE_FAILED)?;

    tracing::info!("POST /api/properties - created {}", listing.id);
    Ok((StatusCode::CREATED, Json(listing)))
}

/// DELETE /api/properties/:id
#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(("id" = String, Path, description = "Store-assigned listing id")),
    responses(
        (status = 200, description = "Listing deleted", body = MessageBody),
        (status = 404, description = "No listing with this id", body = ErrorBody),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let existing = state.store.get(&id).await.or_fail(DELETE_FAILED)?;
    if existing.is_none() {
        tracing::info!("DELETE /api/properties/{} - not found", id);
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }

    state.store.delete(&id).await.or_fail(DELETE_FAILED)?;

    tracing::info!("DELETE /api/properties/{} - deleted", id);
    Ok(Json(json!({ "message": DELETED })))
}
