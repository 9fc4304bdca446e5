use serde::Deserialize;
use serde_json::Value;

use storefront_catalog::{NewProduct, ProductDraft, MISSING_REQUIRED_FIELDS};
use storefront_core::{CategoryId, DomainError, DomainResult};

use crate::app::errors::INVALID_REQUEST_BODY;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

impl ListProductsQuery {
    /// An absent or empty `category` means "all products".
    pub fn category_id(&self) -> DomainResult<Option<CategoryId>> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<CategoryId>().map(Some),
        }
    }
}

/// Body of `POST /products`.
///
/// Required fields stay untyped until the falsy check has run, so `0`,
/// `false`, `""` and `null` all read as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductRequest {
    pub name: Option<Value>,
    pub price: Option<Value>,
    pub image_url: Option<Value>,
    pub variants: Option<Vec<String>>,
    pub stock: Option<i64>,
    pub category_name: Option<Value>,
}

impl CreateProductRequest {
    /// Reads a request body. An empty body, or one not sent as JSON, carries
    /// no fields; so does a JSON array. Unparsable JSON is an error.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> serde_json::Result<Self> {
        if !content_type.is_some_and(is_json_content_type) || body.trim_ascii().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Array(_) => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    fn has_required_fields(&self) -> bool {
        [&self.name, &self.price, &self.image_url, &self.category_name]
            .into_iter()
            .all(|field| field.as_ref().is_some_and(is_truthy))
    }
}

fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.to_ascii_lowercase().ends_with("+json")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn text_field(value: Option<Value>) -> DomainResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(DomainError::validation(INVALID_REQUEST_BODY)),
    }
}

/// Numeric strings are coerced; blank text reads as 0 and other text as NaN.
fn price_field(value: Option<Value>) -> DomainResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Some(0.0)),
        Some(Value::String(s)) => Ok(Some(s.trim().parse().unwrap_or(f64::NAN))),
        Some(_) => Err(DomainError::validation(INVALID_REQUEST_BODY)),
    }
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = DomainError;

    fn try_from(body: CreateProductRequest) -> DomainResult<Self> {
        if !body.has_required_fields() {
            return Err(DomainError::validation(MISSING_REQUIRED_FIELDS));
        }
        NewProduct::try_from(ProductDraft {
            name: text_field(body.name)?,
            price: price_field(body.price)?,
            image_url: text_field(body.image_url)?,
            variants: body.variants,
            stock: body.stock,
            category_name: text_field(body.category_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: serde_json::Value) -> CreateProductRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn maps_camel_case_body_to_new_product() {
        let body = parse(serde_json::json!({
            "name": "Tee",
            "price": 20,
            "imageUrl": "u",
            "variants": ["S", "M"],
            "stock": 3,
            "categoryName": "Apparel",
        }));
        let np = NewProduct::try_from(body).unwrap();
        assert_eq!(np.image_url(), "u");
        assert_eq!(np.category_name(), "Apparel");
        assert_eq!(np.price(), 20.0);
        assert_eq!(np.stock(), 3);
    }

    #[test]
    fn accepts_numeric_string_price() {
        let body = parse(serde_json::json!({
            "name": "Tee", "price": "19.5", "imageUrl": "u", "categoryName": "Apparel",
        }));
        assert_eq!(NewProduct::try_from(body).unwrap().price(), 19.5);
    }

    #[test]
    fn null_optionals_fall_back_to_defaults() {
        let body = parse(serde_json::json!({
            "name": "Tee", "price": 1, "imageUrl": "u", "categoryName": "Apparel",
            "variants": null, "stock": null,
        }));
        let np = NewProduct::try_from(body).unwrap();
        assert!(np.variants().is_empty());
        assert_eq!(np.stock(), 0);
    }

    #[test]
    fn blank_or_garbage_price_is_rejected() {
        let blank = parse(serde_json::json!({
            "name": "Tee", "price": "", "imageUrl": "u", "categoryName": "Apparel",
        }));
        assert_eq!(
            NewProduct::try_from(blank).unwrap_err(),
            DomainError::validation("Missing required fields")
        );

        let garbage = parse(serde_json::json!({
            "name": "Tee", "price": "abc", "imageUrl": "u", "categoryName": "Apparel",
        }));
        assert_eq!(
            NewProduct::try_from(garbage).unwrap_err(),
            DomainError::validation("Invalid price")
        );
    }

    #[test]
    fn price_string_coercing_to_zero_counts_as_missing() {
        for price in ["0", "  "] {
            let body = parse(serde_json::json!({
                "name": "Tee", "price": price, "imageUrl": "u", "categoryName": "Apparel",
            }));
            assert_eq!(
                NewProduct::try_from(body).unwrap_err(),
                DomainError::validation("Missing required fields"),
                "price {price:?}"
            );
        }
    }

    #[test]
    fn falsy_values_of_any_type_are_missing() {
        for (field, value) in [
            ("name", serde_json::json!(0)),
            ("name", serde_json::json!(false)),
            ("price", serde_json::json!(false)),
            ("imageUrl", serde_json::json!(null)),
            ("categoryName", serde_json::json!(0.0)),
        ] {
            let mut raw = serde_json::json!({
                "name": "Tee", "price": 20, "imageUrl": "u", "categoryName": "Apparel",
            });
            raw[field] = value;
            assert_eq!(
                NewProduct::try_from(parse(raw)).unwrap_err(),
                DomainError::validation("Missing required fields"),
                "{field}"
            );
        }
    }

    #[test]
    fn truthy_value_of_the_wrong_type_is_a_bad_body() {
        let body = parse(serde_json::json!({
            "name": 5, "price": 20, "imageUrl": "u", "categoryName": "Apparel",
        }));
        assert_eq!(
            NewProduct::try_from(body).unwrap_err(),
            DomainError::validation("Invalid request body")
        );

        let body = parse(serde_json::json!({
            "name": "Tee", "price": true, "imageUrl": "u", "categoryName": "Apparel",
        }));
        assert_eq!(
            NewProduct::try_from(body).unwrap_err(),
            DomainError::validation("Invalid request body")
        );
    }

    #[test]
    fn bodies_without_json_fields_read_as_empty() {
        let json = Some("application/json");
        for (content_type, raw) in [
            (None, &br#"{"name":"Tee"}"#[..]),
            (Some("text/plain"), &br#"{"name":"Tee"}"#[..]),
            (json, &b""[..]),
            (json, &b"  \n"[..]),
            (json, &b"[]"[..]),
        ] {
            let body = CreateProductRequest::from_body(content_type, raw).unwrap();
            assert!(body.name.is_none());
            assert!(!body.has_required_fields());
        }
    }

    #[test]
    fn json_bodies_are_parsed() {
        let body = CreateProductRequest::from_body(
            Some("application/json; charset=utf-8"),
            br#"{"name":"Tee","price":"19.5","imageUrl":"u","categoryName":"Apparel"}"#,
        )
        .unwrap();
        assert_eq!(NewProduct::try_from(body).unwrap().price(), 19.5);

        assert!(CreateProductRequest::from_body(Some("application/json"), b"{not json").is_err());
        assert!(CreateProductRequest::from_body(Some("application/json"), b"\"Tee\"").is_err());
        assert!(CreateProductRequest::from_body(Some("application/json"), br#"{"stock":"x"}"#).is_err());
    }

    #[test]
    fn category_query_parsing() {
        let q = |c: Option<&str>| ListProductsQuery {
            category: c.map(str::to_string),
        };
        assert_eq!(q(None).category_id().unwrap(), None);
        assert_eq!(q(Some("")).category_id().unwrap(), None);
        assert_eq!(q(Some("3")).category_id().unwrap(), Some(CategoryId::new(3)));
        assert!(q(Some("Apparel")).category_id().is_err());
    }
}
