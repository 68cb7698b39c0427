use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tessera_core::ConfigResponse;

use crate::extractors::accept::YAML_CONTENT_TYPE;

pub fn to_response(data: &ConfigResponse) -> Result<Response, super::SerializeError> {
    let body = serde_yaml::to_string(data)?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], body).into_response())
}
