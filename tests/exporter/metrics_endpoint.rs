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

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use argocd_extra_app_info_exporter::exporter::server::{build_router, AppState};

use crate::support::{harness, record, StubResponse};

async fn scrape(router: axum::Router, path: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request built"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

#[tokio::test]
async fn scrape_reflects_the_latest_cycle() {
    let h = harness(
        vec![
            StubResponse::Records(vec![
                record("argocd", "guestbook", "default", "HEAD"),
                record("argocd", "retired", "default", "v0.9"),
            ]),
            StubResponse::Records(vec![record("argocd", "guestbook", "default", "v1.0.0")]),
        ],
        &[],
    );
    let state = Arc::new(AppState {
        metrics: Arc::clone(&h.metrics),
        health: Arc::clone(&h.health),
    });
    let router = build_router("/metrics", state).expect("router built");

    h.refresh.run_cycle().await;
    let (status, text) = scrape(router.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("revision=\"HEAD\""));
    assert!(text.contains("name=\"retired\""));

    h.refresh.run_cycle().await;
    let (_, text) = scrape(router, "/metrics").await;
    assert!(text.contains("revision=\"v1.0.0\""));
    assert!(!text.contains("name=\"retired\""), "stale series survived: {text}");
    assert!(!text.contains("revision=\"HEAD\""));
}

#[tokio::test]
async fn scrape_after_fetch_failure_serves_previous_cycle() {
    let h = harness(
        vec![
            StubResponse::Records(vec![record("argocd", "guestbook", "default", "HEAD")]),
            StubResponse::Failure("api unavailable"),
        ],
        &[],
    );
    let state = Arc::new(AppState {
        metrics: Arc::clone(&h.metrics),
        health: Arc::clone(&h.health),
    });
    let router = build_router("/metrics", state).expect("router built");

    h.refresh.run_cycle().await;
    h.refresh.run_cycle().await;

    let (status, text) = scrape(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("name=\"guestbook\""));
    assert!(text.contains("result=\"error\""));
}

#[tokio::test]
async fn filtered_records_never_reach_the_exposition() {
    let h = harness(
        vec![StubResponse::Records(vec![
            record("argocd", "kept", "default", "v1"),
            record("argocd", "excluded", "default", "main"),
            record("argocd", "unset", "default", ""),
        ])],
        &["main"],
    );
    let state = Arc::new(AppState {
        metrics: Arc::clone(&h.metrics),
        health: Arc::clone(&h.health),
    });
    let router = build_router("/metrics", state).expect("router built");

    h.refresh.run_cycle().await;

    let (_, text) = scrape(router, "/metrics").await;
    assert!(text.contains("name=\"kept\""));
    assert!(!text.contains("name=\"excluded\""));
    assert!(!text.contains("name=\"unset\""));
}
