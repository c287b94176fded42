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
use std::error::Error;
use std::sync::{Arc, PoisonError, RwLock};

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

const METRICS_NAMESPACE: &str = "argocd";
const APP_INFO_NAME: &str = "extra_app_info";
const APP_INFO_HELP: &str = "Extra information about application.";
const APP_INFO_LABELS: [&str; 4] = ["namespace", "name", "project", "revision"];

/// Identity of one exported gauge series.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AppInfoKey {
    pub namespace: String,
    pub name: String,
    pub project: String,
    pub revision: String,
}

/// Concurrency-safe store for the app-info series.
///
/// The refresh loop publishes a freshly built map at the end of each
/// successful cycle; scrapes clone the current `Arc`, so a reader always
/// observes a single cycle's data in full and entries for applications that
/// disappeared are dropped with the swap.
#[derive(Default)]
pub struct AppInfoRegistry {
    current: RwLock<Arc<HashMap<AppInfoKey, f64>>>,
}

impl AppInfoRegistry {
    /// Atomically replaces the whole series set with `entries`.
    pub fn publish(&self, entries: HashMap<AppInfoKey, f64>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(entries);
    }

    /// Inserts or overwrites a single series.
    pub fn upsert(&self, key: AppInfoKey, value: f64) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next: HashMap<AppInfoKey, f64> = guard.as_ref().clone();
        next.insert(key, value);
        *guard = Arc::new(next);
    }

    /// Immutable view of the current series set.
    pub fn snapshot(&self) -> Arc<HashMap<AppInfoKey, f64>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

/// Prometheus collector rendering the registry snapshot at gather time.
#[derive(Clone)]
pub struct AppInfoCollector {
    registry: Arc<AppInfoRegistry>,
    desc: Desc,
}

impl AppInfoCollector {
    pub fn new(registry: Arc<AppInfoRegistry>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let desc = Desc::new(
            APP_INFO_NAME.to_string(),
            APP_INFO_HELP.to_string(),
            APP_INFO_LABELS.iter().map(|l| l.to_string()).collect(),
            HashMap::new(),
        )?;
        Ok(Self { registry, desc })
    }
}

impl Collector for AppInfoCollector {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.registry.snapshot();
        let gauge = GaugeVec::new(Opts::new(APP_INFO_NAME, APP_INFO_HELP), &APP_INFO_LABELS)
            .expect("failed to build app info gauge");
        for (key, value) in snapshot.iter() {
            gauge
                .with_label_values(&[
                    key.namespace.as_str(),
                    key.name.as_str(),
                    key.project.as_str(),
                    key.revision.as_str(),
                ])
                .set(*value);
        }
        gauge.collect()
    }
}

#[derive(Copy, Clone, Debug)]
pub enum FetchCycleResult {
    Success,
    Error,
    Empty,
}

impl FetchCycleResult {
    fn as_label(self) -> &'static str {
        match self {
            FetchCycleResult::Success => "success",
            FetchCycleResult::Error => "error",
            FetchCycleResult::Empty => "empty",
        }
    }
}

/// Owned metric state shared between the refresh loop and the HTTP server.
pub struct ExporterMetrics {
    registry: Registry,
    app_info: Arc<AppInfoRegistry>,
    fetch_cycles: IntCounterVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let registry = Registry::new_custom(Some(METRICS_NAMESPACE.to_string()), None)?;

        let app_info = Arc::new(AppInfoRegistry::default());
        let collector = AppInfoCollector::new(Arc::clone(&app_info))?;
        registry.register(Box::new(collector))?;

        let fetch_cycles = IntCounterVec::new(
            Opts::new(
                "app_fetch_cycles_total",
                "Application fetch cycles grouped by result",
            ),
            &["result"],
        )?;
        registry.register(Box::new(fetch_cycles.clone()))?;

        Ok(Self {
            registry,
            app_info,
            fetch_cycles,
        })
    }

    pub fn app_info(&self) -> &Arc<AppInfoRegistry> {
        &self.app_info
    }

    pub fn record_fetch_cycle(&self, result: FetchCycleResult) {
        self.fetch_cycles
            .with_label_values(&[result.as_label()])
            .inc();
    }

    /// Renders all registered metrics in the text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|err| Box::new(err) as Box<dyn Error + Send + Sync>)?;
        Ok(buffer)
    }
}
