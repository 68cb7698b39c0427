//! Tower middleware.
//!
//! - `RequestIdLayer`: propagates or generates `x-request-id`
//! - `LoggingLayer`: labelled call logging, applied per route group

mod logging;
mod request_id;

pub use logging::{LogOptions, LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
