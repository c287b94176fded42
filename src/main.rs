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

use std::error::Error;
use std::process;
use std::sync::Arc;

use clap::Parser;

use argocd_extra_app_info_exporter::exporter::argocd::client::ArgoClient;
use argocd_extra_app_info_exporter::exporter::argocd::credentials;
use argocd_extra_app_info_exporter::exporter::buildinfo;
use argocd_extra_app_info_exporter::exporter::cli::ExporterArgs;
use argocd_extra_app_info_exporter::exporter::logger::{log_error, log_info, set_log_format};
use argocd_extra_app_info_exporter::exporter::observability::health::ExporterHealth;
use argocd_extra_app_info_exporter::exporter::observability::metrics::ExporterMetrics;
use argocd_extra_app_info_exporter::exporter::refresh::{RefreshConfig, RefreshLoop};
use argocd_extra_app_info_exporter::exporter::server::{self, AppState};

#[tokio::main]
async fn main() {
    let args = ExporterArgs::parse();

    if args.version {
        println!("{}", buildinfo::version());
        return;
    }

    set_log_format(args.log_format.into());

    if let Err(err) = run(args).await {
        let message = err.to_string();
        log_error("main", "Exporter terminated", &[("error", message.as_str())]);
        process::exit(1);
    }
}

async fn run(args: ExporterArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let interval = args.effective_interval();
    let interval_text = format!("{}s", interval.as_secs());
    let version = buildinfo::version();
    log_info(
        "main",
        "Starting exporter",
        &[
            ("version", version.as_str()),
            ("interval", interval_text.as_str()),
        ],
    );

    let credentials = credentials::resolve(args.kubeconfig.as_deref())?;
    let client = ArgoClient::new(credentials)?;

    let metrics = Arc::new(ExporterMetrics::new()?);
    let health = Arc::new(ExporterHealth::default());

    let config = RefreshConfig {
        interval,
        namespace: args.namespace_scope().map(str::to_string),
        excluded_revisions: args
            .exclude_revisions
            .iter()
            .filter(|r| !r.is_empty())
            .cloned()
            .collect(),
    };
    drop(RefreshLoop::new(client, config, Arc::clone(&metrics), Arc::clone(&health)).spawn());

    let state = Arc::new(AppState { metrics, health });
    server::serve(args.metrics_listen_address, &args.metrics_path, state).await
}
