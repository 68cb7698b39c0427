use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tessera_core::{ConfigResponse, OutputFormat, ResponseRenderer};

/// Sends the sources merged and flattened to `key=value` lines; the most
/// specific source wins each key.
pub fn to_response(config: &ConfigResponse) -> Result<Response, super::SerializeError> {
    let body = ResponseRenderer.render_properties(&config.property_sources)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, OutputFormat::Properties.content_type())],
        body,
    )
        .into_response())
}
