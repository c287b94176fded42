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

//! The timer-driven fetch-filter-publish loop.

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::exporter::argocd::types::ApplicationRecord;
use crate::exporter::logger::{log_error, log_info};
use crate::exporter::observability::health::ExporterHealth;
use crate::exporter::observability::metrics::{AppInfoKey, ExporterMetrics, FetchCycleResult};

const COMPONENT: &str = "refresh";

/// Source of application records, implemented by the API client and by
/// test stubs.
pub trait ApplicationLister: Send + Sync + 'static {
    fn list_applications(
        &self,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, Box<dyn Error + Send + Sync>>> + Send;
}

#[derive(Clone)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub namespace: Option<String>,
    pub excluded_revisions: HashSet<String>,
}

/// Filter policy: a record is exported unless its revision is unset or
/// explicitly excluded. Stateless across cycles.
pub fn include_record(record: &ApplicationRecord, excluded: &HashSet<String>) -> bool {
    !record.revision.is_empty() && !excluded.contains(&record.revision)
}

pub struct RefreshLoop<L> {
    lister: L,
    config: RefreshConfig,
    metrics: Arc<ExporterMetrics>,
    health: Arc<ExporterHealth>,
}

impl<L: ApplicationLister> RefreshLoop<L> {
    pub fn new(
        lister: L,
        config: RefreshConfig,
        metrics: Arc<ExporterMetrics>,
        health: Arc<ExporterHealth>,
    ) -> Self {
        Self {
            lister,
            config,
            metrics,
            health,
        }
    }

    /// Runs the loop until process shutdown. Cycles never overlap: a fetch
    /// slower than the period delays the next tick instead of running
    /// concurrently with it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// One fetch-filter-publish cycle. A failed or empty fetch leaves the
    /// registry exactly as it was; a successful fetch replaces the full
    /// series set atomically.
    pub async fn run_cycle(&self) {
        let namespace = self.config.namespace.as_deref();
        let records = match self.lister.list_applications(namespace).await {
            Ok(records) => records,
            Err(err) => {
                let message = err.to_string();
                log_error(
                    COMPONENT,
                    "Failed to list applications; skipping cycle",
                    &[("error", message.as_str())],
                );
                self.metrics.record_fetch_cycle(FetchCycleResult::Error);
                return;
            }
        };

        if records.is_empty() {
            log_info(COMPONENT, "No applications found; skipping cycle", &[]);
            self.metrics.record_fetch_cycle(FetchCycleResult::Empty);
            return;
        }

        let mut entries = HashMap::with_capacity(records.len());
        for record in &records {
            if include_record(record, &self.config.excluded_revisions) {
                entries.insert(
                    AppInfoKey {
                        namespace: record.namespace.clone(),
                        name: record.name.clone(),
                        project: record.project.clone(),
                        revision: record.revision.clone(),
                    },
                    1.0,
                );
            }
        }

        let considered = records.len().to_string();
        let exported = entries.len().to_string();
        self.metrics.app_info().publish(entries);
        self.metrics.record_fetch_cycle(FetchCycleResult::Success);
        self.health.mark_refresh_succeeded();
        log_info(
            COMPONENT,
            "Refreshed application info",
            &[
                ("considered", considered.as_str()),
                ("exported", exported.as_str()),
            ],
        );
    }
}
