//! Generic record handlers
//!
//! One set of handlers serves every record kind; the route picks the wire
//! type and axum picks the matching `RecordService<W>` out of the router
//! state through `FromRef`.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::WireObject;
use crate::application::services::RecordService;
use crate::interfaces::http::common::{ApiError, Collection, ValidatedJson};

/// `GET /api/{records}`
pub async fn list<W: WireObject>(
    State(service): State<RecordService<W>>,
) -> Result<Json<Collection<W>>, ApiError> {
    Ok(Json(service.find_all().await?.into()))
}

/// `GET /api/{records}/{id}`
pub async fn get_one<W: WireObject>(
    State(service): State<RecordService<W>>,
    Path(id): Path<i32>,
) -> Result<Json<W>, ApiError> {
    Ok(Json(service.find_by_id(id).await?))
}

/// `POST /api/{records}`
pub async fn create<W: WireObject>(
    State(service): State<RecordService<W>>,
    ValidatedJson(body): ValidatedJson<W>,
) -> Result<Json<W>, ApiError> {
    Ok(Json(service.save(body).await?))
}

/// `PUT /api/{records}`; identity taken from the body.
pub async fn update<W: WireObject>(
    State(service): State<RecordService<W>>,
    ValidatedJson(body): ValidatedJson<W>,
) -> Result<Json<W>, ApiError> {
    Ok(Json(service.update(body).await?))
}

/// `PUT /api/{records}/{id}`; the path identity wins.
pub async fn update_by_id<W: WireObject>(
    State(service): State<RecordService<W>>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<W>,
) -> Result<Json<W>, ApiError> {
    Ok(Json(service.update_by_id(id, body).await?))
}

/// `DELETE /api/{records}/{id}`
pub async fn delete<W: WireObject>(
    State(service): State<RecordService<W>>,
    Path(id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    service.delete_by_id(id).await?;
    Ok(Json(true))
}
