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

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Debug, Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn is_ready(&self) -> bool {
        self.status == HealthStatus::Ready
    }
}

/// Liveness and readiness state shared with the HTTP server.
///
/// Readiness flips once the refresh loop completes its first successful
/// cycle; a scrape before that point would serve an empty gauge set.
#[derive(Default)]
pub struct ExporterHealth {
    refresh_succeeded: AtomicBool,
}

impl ExporterHealth {
    pub fn mark_refresh_succeeded(&self) {
        self.refresh_succeeded.store(true, Ordering::Relaxed);
    }

    pub fn readiness_report(&self) -> HealthReport {
        if self.refresh_succeeded.load(Ordering::Relaxed) {
            HealthReport {
                status: HealthStatus::Ready,
                components: vec![ComponentHealth {
                    name: "refresh_loop",
                    healthy: true,
                    error: None,
                }],
            }
        } else {
            HealthReport {
                status: HealthStatus::Degraded,
                components: vec![ComponentHealth {
                    name: "refresh_loop",
                    healthy: false,
                    error: Some("no refresh cycle has completed yet".to_string()),
                }],
            }
        }
    }

    pub fn liveness_report(&self) -> HealthReport {
        HealthReport {
            status: HealthStatus::Ready,
            components: vec![ComponentHealth {
                name: "process",
                healthy: true,
                error: None,
            }],
        }
    }
}
