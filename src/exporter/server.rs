/*
 * Copyright (C) 2026 The Argo CD Extra App Info Exporter Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! HTTP server exposing the metric snapshot and health endpoints.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as HyperAcceptor;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;

use crate::exporter::logger::{log_error, log_info};
use crate::exporter::observability::health::ExporterHealth;
use crate::exporter::observability::metrics::ExporterMetrics;
use crate::exporter::util::error::{new_error, with_context};

const COMPONENT: &str = "server";
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// Slow-client bounds. The header read timeout also caps how long an idle
// keep-alive connection may sit between requests.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AppState {
    pub metrics: Arc<ExporterMetrics>,
    pub health: Arc<ExporterHealth>,
}

pub fn build_router(
    metrics_path: &str,
    state: Arc<AppState>,
) -> Result<Router, Box<dyn Error + Send + Sync>> {
    if !metrics_path.starts_with('/') {
        return Err(new_error(format!(
            "metrics path '{metrics_path}' must start with '/'"
        )));
    }

    let router = Router::new()
        .route(metrics_path, get(metrics))
        .route("/healthz", get(readyz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
        .layer(middleware::from_fn(request_timeout))
        .with_state(state);
    Ok(router)
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.gather() {
        Ok(buffer) => {
            let mut response = Response::new(Body::from(buffer));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE),
            );
            response
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {err}"),
        )
            .into_response(),
    }
}

async fn readyz(State(state): State<Arc<AppState>>) -> Response {
    let report = state.health.readiness_report();
    let status = if report.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

async fn livez(State(state): State<Arc<AppState>>) -> Response {
    let report = state.health.liveness_report();
    (StatusCode::OK, Json(report)).into_response()
}

async fn request_timeout(request: Request, next: Next) -> Response {
    match tokio::time::timeout(REQUEST_TIMEOUT, next.run(request)).await {
        Ok(response) => response,
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "request timed out".to_string(),
        )
            .into_response(),
    }
}

/// Binds the listener and serves requests until process shutdown. Request
/// handling only touches the registry through `snapshot()`, so scrapes
/// complete in bounded time regardless of in-flight fetches.
pub async fn serve(
    addr: SocketAddr,
    metrics_path: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = build_router(metrics_path, state)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| with_context(e, format!("Failed to bind metrics listener at {addr}")))?;

    let addr_text = addr.to_string();
    log_info(
        COMPONENT,
        "Metrics server listening",
        &[("addr", addr_text.as_str()), ("path", metrics_path)],
    );

    loop {
        let (stream, remote_addr) = listener
            .accept()
            .await
            .map_err(|e| with_context(e, "Failed to accept incoming TCP connection"))?;
        let service = TowerToHyperService::new(app.clone());
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let mut builder = HyperAcceptor::new(TokioExecutor::new());
            builder
                .http1()
                .timer(TokioTimer::new())
                .header_read_timeout(HEADER_READ_TIMEOUT);
            if let Err(err) = builder.serve_connection(io, service).await {
                let should_log = err
                    .downcast_ref::<hyper::Error>()
                    .map(|hyper_err| !(hyper_err.is_closed() || hyper_err.is_incomplete_message()))
                    .unwrap_or(true);
                if should_log {
                    let error_text = err.to_string();
                    let remote_addr_text = remote_addr.to_string();
                    log_error(
                        COMPONENT,
                        "HTTP serving error",
                        &[
                            ("remote_addr", remote_addr_text.as_str()),
                            ("error", error_text.as_str()),
                        ],
                    );
                }
            }
        });
    }
}
