use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use storefront_catalog::NewProduct;
use storefront_core::ProductId;

use crate::app::dto::{CreateProductRequest, ListProductsQuery};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> axum::response::Response {
    let category_id = match query
        .map_err(|_| ())
        .and_then(|Query(q)| q.category_id().map_err(|_| ()))
    {
        Ok(v) => v,
        Err(()) => return errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_CATEGORY_ID),
    };

    match services.list_products(category_id).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::store_error_to_response("list_products", e, errors::FAILED_TO_FETCH_PRODUCTS),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    // A non-numeric id cannot name a stored product.
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::NOT_FOUND, errors::PRODUCT_NOT_FOUND),
    };

    match services.get_product(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, errors::PRODUCT_NOT_FOUND),
        Err(e) => errors::store_error_to_response("get_product", e, errors::FAILED_TO_FETCH_PRODUCT),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let body = match CreateProductRequest::from_body(content_type, &body) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "rejected product body");
            return errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_REQUEST_BODY);
        }
    };

    let new_product = match NewProduct::try_from(body) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.create_product(new_product).await {
        Ok(created) => {
            tracing::info!(
                product_id = %created.product.id,
                category_id = %created.category.id,
                "product created"
            );
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => errors::store_error_to_response("create_product", e, errors::FAILED_TO_CREATE_PRODUCT),
    }
}
