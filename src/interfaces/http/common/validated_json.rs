//! Validated JSON extractor
//!
//! `ValidatedJson<T>` deserializes like `axum::Json<T>` and then runs
//! `validator::Validate::validate()`. Malformed bodies are rejected with 400,
//! field violations with 422 and a `field: message` list.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", rejection.body_text()),
            ),
            Self::Invalid(errors) => (StatusCode::UNPROCESSABLE_ENTITY, describe(&errors)),
        };
        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        value.validate().map_err(ValidatedJsonRejection::Invalid)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ShipmentDto;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    async fn handler(ValidatedJson(body): ValidatedJson<ShipmentDto>) -> String {
        body.ordered_quantity.to_string()
    }

    async fn send(body: impl Into<Body>) -> StatusCode {
        let app = Router::new().route("/shipments", post(handler));
        let request = Request::builder()
            .method("POST")
            .uri("/shipments")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    fn shipment(quantity: i32) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "orderedQuantity": quantity,
            "product": {"productId": 7},
            "order": {"orderId": 3}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn valid_body_is_accepted() {
        assert_eq!(send(shipment(2)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        assert_eq!(send("{not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn field_violation_is_unprocessable() {
        assert_eq!(send(shipment(0)).await, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
