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

use std::collections::VecDeque;
use std::error::Error;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argocd_extra_app_info_exporter::exporter::argocd::types::ApplicationRecord;
use argocd_extra_app_info_exporter::exporter::observability::health::ExporterHealth;
use argocd_extra_app_info_exporter::exporter::observability::metrics::{
    AppInfoKey, ExporterMetrics,
};
use argocd_extra_app_info_exporter::exporter::refresh::{
    ApplicationLister, RefreshConfig, RefreshLoop,
};

pub fn record(namespace: &str, name: &str, project: &str, revision: &str) -> ApplicationRecord {
    ApplicationRecord {
        namespace: namespace.to_string(),
        name: name.to_string(),
        project: project.to_string(),
        revision: revision.to_string(),
    }
}

pub fn key(namespace: &str, name: &str, project: &str, revision: &str) -> AppInfoKey {
    AppInfoKey {
        namespace: namespace.to_string(),
        name: name.to_string(),
        project: project.to_string(),
        revision: revision.to_string(),
    }
}

pub enum StubResponse {
    Records(Vec<ApplicationRecord>),
    Failure(&'static str),
}

/// Scripted application source; each cycle consumes the next response and
/// an exhausted script yields empty lists.
pub struct StubLister {
    responses: Mutex<VecDeque<StubResponse>>,
}

impl StubLister {
    pub fn new(responses: Vec<StubResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl ApplicationLister for StubLister {
    fn list_applications(
        &self,
        _namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, Box<dyn Error + Send + Sync>>> + Send
    {
        let next = self.responses.lock().unwrap().pop_front();
        async move {
            match next {
                Some(StubResponse::Records(records)) => Ok(records),
                Some(StubResponse::Failure(message)) => {
                    Err(std::io::Error::other(message).into())
                }
                None => Ok(Vec::new()),
            }
        }
    }
}

pub struct Harness {
    pub metrics: Arc<ExporterMetrics>,
    pub health: Arc<ExporterHealth>,
    pub refresh: RefreshLoop<StubLister>,
}

pub fn harness(responses: Vec<StubResponse>, excluded: &[&str]) -> Harness {
    let metrics = Arc::new(ExporterMetrics::new().expect("metrics constructed"));
    let health = Arc::new(ExporterHealth::default());
    let config = RefreshConfig {
        interval: Duration::from_secs(60),
        namespace: None,
        excluded_revisions: excluded.iter().map(|r| r.to_string()).collect(),
    };
    let refresh = RefreshLoop::new(
        StubLister::new(responses),
        config,
        Arc::clone(&metrics),
        Arc::clone(&health),
    );
    Harness {
        metrics,
        health,
        refresh,
    }
}
