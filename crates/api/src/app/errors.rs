use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::StoreError;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const FAILED_TO_FETCH_PRODUCTS: &str = "Failed to fetch products";
pub const FAILED_TO_FETCH_PRODUCT: &str = "Failed to fetch product";
pub const FAILED_TO_CREATE_PRODUCT: &str = "Failed to create product";
pub const FAILED_TO_FETCH_CATEGORIES: &str = "Failed to fetch categories";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";
pub const INVALID_CATEGORY_ID: &str = "Invalid category id";

/// Every failure body is `{"error": "<message>"}`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, msg),
    }
}

/// Log the store fault and answer with a generic 500; the cause stays server-side.
pub fn store_error_to_response(
    operation: &'static str,
    err: StoreError,
    message: &'static str,
) -> axum::response::Response {
    tracing::error!(operation, error = %err, "catalog store operation failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
