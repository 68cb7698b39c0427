//! Labelled request logging applied per route group.

use axum::{
    body::Body,
    http::{Request, Response},
};
use std::{
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{Instrument, error, info, info_span, warn};

use super::request_id::REQUEST_ID_HEADER;

/// What [`LoggingLayer`] records besides start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Log the path and query string on entry.
    pub log_params: bool,
    /// Log the response status.
    pub log_result: bool,
    /// Log the latency.
    pub log_duration: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_params: true,
            log_result: false,
            log_duration: true,
        }
    }
}

/// Layer that logs requests under a fixed label, e.g. `CONFIG`.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    label: &'static str,
    options: LogOptions,
}

impl LoggingLayer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            options: LogOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LogOptions) -> Self {
        self.options = options;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware {
            inner,
            label: self.label,
            options: self.options,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
    label: &'static str,
    options: LogOptions,
}

impl<S> Service<Request<Body>> for LoggingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let start = Instant::now();
        let options = self.options;
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let query = request.uri().query().unwrap_or_default().to_string();

        // Set by RequestIdMiddleware when it wraps this layer.
        let request_id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let span = info_span!(
            "call",
            label = self.label,
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        // Take the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                if options.log_params {
                    info!(query = %query, "start");
                } else {
                    info!("start");
                }

                let response = inner.call(request).await?;

                let status = response.status();
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                if status.is_server_error() {
                    error!(status = status.as_u16(), elapsed_ms, "failed");
                } else if status.is_client_error() {
                    warn!(status = status.as_u16(), elapsed_ms, "rejected");
                } else if options.log_result && options.log_duration {
                    info!(status = status.as_u16(), elapsed_ms, "end");
                } else if options.log_result {
                    info!(status = status.as_u16(), "end");
                } else if options.log_duration {
                    info!(elapsed_ms, "end");
                } else {
                    info!("end");
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
