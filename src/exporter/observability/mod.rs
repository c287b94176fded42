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

//! Observability primitives for the exporter.
//!
//! Metric names follow the Prometheus conventions used by the Argo CD
//! ecosystem: snake_case names with the `argocd` prefix and counters ending
//! in `_total`. Label keys mirror the application resource identifiers
//! (`namespace`, `name`, `project`, `revision`) so the exported series can
//! be joined with the metrics Argo CD itself exposes.

pub mod health;
pub mod metrics;
