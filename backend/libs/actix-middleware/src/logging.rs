//! Logging middleware
//!
//! Logs one line when a request starts and one when it completes, tagged with
//! the request id when `RequestId` runs outside this middleware.

use crate::request_id::RequestIdValue;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let request_id = req
            .extensions()
            .get::<RequestIdValue>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "HTTP request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &res {
                Ok(res) => {
                    let status = res.status();
                    if status.is_server_error() {
                        tracing::error!(
                            request_id = %request_id,
                            method = %method,
                            path = %path,
                            status = status.as_u16(),
                            duration_ms = elapsed_ms,
                            "HTTP request failed"
                        );
                    } else {
                        tracing::info!(
                            request_id = %request_id,
                            method = %method,
                            path = %path,
                            status = status.as_u16(),
                            duration_ms = elapsed_ms,
                            "HTTP request completed"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        status = e.as_response_error().status_code().as_u16(),
                        duration_ms = elapsed_ms,
                        "HTTP request rejected by middleware"
                    );
                }
            }

            res
        })
    }
}
