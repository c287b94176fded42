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

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::exporter::logger::LogFormat;

/// Fetch period used when `--interval` is unset or zero.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Exports extra information about Argo CD applications as Prometheus metrics.
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(disable_version_flag = true)]
pub struct ExporterArgs {
    /// Print build/version information and exit
    #[arg(long)]
    pub version: bool,

    /// Address the metrics HTTP server binds to
    #[arg(long, default_value = "0.0.0.0:9999")]
    pub metrics_listen_address: SocketAddr,

    /// Path serving the Prometheus exposition format
    #[arg(long, default_value = "/metrics")]
    pub metrics_path: String,

    /// Application fetch interval (e.g. 30s, 10m, 1h)
    #[arg(long, value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Namespace to fetch applications from; empty fetches all namespaces
    #[arg(long, default_value = "")]
    pub namespace: String,

    /// Comma-separated target revisions to exclude from the exported metric
    #[arg(long, value_delimiter = ',')]
    pub exclude_revisions: Vec<String>,

    /// Path to the kubeconfig used when running outside the cluster
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

impl ExporterArgs {
    /// The configured fetch period, falling back to the default when the
    /// flag is unset or parses to zero.
    pub fn effective_interval(&self) -> Duration {
        match self.interval {
            Some(interval) if !interval.is_zero() => interval,
            _ => DEFAULT_INTERVAL,
        }
    }

    /// The namespace scope as an `Option`, treating the empty string as
    /// "all namespaces".
    pub fn namespace_scope(&self) -> Option<&str> {
        if self.namespace.is_empty() {
            None
        } else {
            Some(self.namespace.as_str())
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Parses a compact duration of the form `<int><unit>` where the unit is a
/// single trailing `s`, `m` or `h` (case-insensitive).
pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let mut chars = value.chars();
    let unit = chars
        .next_back()
        .ok_or_else(|| "interval must not be empty".to_string())?;
    let digits = chars.as_str();

    let count: u64 = digits.parse().map_err(|_| {
        format!("invalid interval '{value}': expected an integer followed by s, m or h")
    })?;

    let unit_seconds = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        other => return Err(format!("invalid interval unit '{other}': expected s, m or h")),
    };

    let seconds = count
        .checked_mul(unit_seconds)
        .ok_or_else(|| format!("interval '{value}' is out of range"))?;
    Ok(Duration::from_secs(seconds))
}
