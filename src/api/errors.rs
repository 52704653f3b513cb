use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    catalog::{Crop, Region},
    error::AdvisoryError,
};

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, available) = match self.0.downcast_ref::<AdvisoryError>() {
            Some(AdvisoryError::InvalidSelection { field, .. }) => {
                (StatusCode::BAD_REQUEST, catalog_names(field))
            }
            None => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        let mut body = json!({ "error": self.0.to_string() });
        if let Some(names) = available {
            body["available"] = json!(names);
        }
        (status, Json(body)).into_response()
    }
}

/// Valid values for a rejected catalog selection, so clients can recover.
fn catalog_names(field: &str) -> Option<Vec<&'static str>> {
    match field {
        "region" => Some(Region::ALL.into_iter().map(Region::name).collect()),
        "crop" => Some(Crop::ALL.into_iter().map(Crop::name).collect()),
        _ => None,
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}
