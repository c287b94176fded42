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

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use argocd_extra_app_info_exporter::exporter::observability::metrics::AppInfoRegistry;

use crate::support::{harness, key, record, StubResponse};

#[tokio::test]
async fn excluded_revision_keeps_registry_empty() {
    let h = harness(
        vec![StubResponse::Records(vec![record("a", "app1", "p", "main")])],
        &["main"],
    );
    h.refresh.run_cycle().await;
    assert!(h.metrics.app_info().is_empty());
}

#[tokio::test]
async fn empty_revision_keeps_registry_empty() {
    let h = harness(
        vec![StubResponse::Records(vec![record("a", "app1", "p", "")])],
        &[],
    );
    h.refresh.run_cycle().await;
    assert!(h.metrics.app_info().is_empty());
}

#[tokio::test]
async fn included_application_becomes_one_series() {
    let h = harness(
        vec![StubResponse::Records(vec![record("a", "app1", "p", "v1")])],
        &[],
    );
    h.refresh.run_cycle().await;

    let snapshot = h.metrics.app_info().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get(&key("a", "app1", "p", "v1")), Some(&1.0));
}

#[tokio::test]
async fn fetch_failure_leaves_registry_untouched() {
    let h = harness(
        vec![
            StubResponse::Records(vec![record("a", "app1", "p", "v1")]),
            StubResponse::Failure("api unavailable"),
        ],
        &[],
    );
    h.refresh.run_cycle().await;
    let before = h.metrics.app_info().snapshot();

    h.refresh.run_cycle().await;
    let after = h.metrics.app_info().snapshot();
    assert_eq!(before.len(), after.len());
    assert!(after.contains_key(&key("a", "app1", "p", "v1")));
}

#[tokio::test]
async fn readiness_stays_degraded_until_a_cycle_succeeds() {
    let h = harness(
        vec![
            StubResponse::Failure("api unavailable"),
            StubResponse::Records(vec![record("a", "app1", "p", "v1")]),
        ],
        &[],
    );

    h.refresh.run_cycle().await;
    assert!(!h.health.readiness_report().is_ready());

    h.refresh.run_cycle().await;
    assert!(h.health.readiness_report().is_ready());
}

// A snapshot taken while cycles are being published must always equal one
// complete cycle's set, never a mix of two.
#[test]
fn snapshots_never_observe_a_partial_cycle() {
    let registry = Arc::new(AppInfoRegistry::default());

    let cycle_a: HashMap<_, _> = (0..8)
        .map(|i| (key("a", &format!("app{i}"), "p", "v1"), 1.0))
        .collect();
    let cycle_b: HashMap<_, _> = (0..8)
        .map(|i| (key("b", &format!("app{i}"), "q", "v2"), 1.0))
        .collect();

    registry.publish(cycle_a.clone());

    let writer = {
        let registry = Arc::clone(&registry);
        let cycle_a = cycle_a.clone();
        let cycle_b = cycle_b.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                registry.publish(cycle_b.clone());
                registry.publish(cycle_a.clone());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let cycle_a = cycle_a.clone();
            let cycle_b = cycle_b.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = registry.snapshot();
                    assert!(
                        *snapshot == cycle_a || *snapshot == cycle_b,
                        "snapshot mixed two cycles: {} entries",
                        snapshot.len()
                    );
                }
            })
        })
        .collect();

    writer.join().expect("writer finished");
    for reader in readers {
        reader.join().expect("reader finished");
    }
}
