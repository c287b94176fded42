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

use serde::Deserialize;

/// Project an application belongs to when its spec leaves the field empty.
/// Mirrors the Argo CD API server's own defaulting.
pub const DEFAULT_PROJECT: &str = "default";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApplicationList {
    #[serde(default)]
    pub items: Vec<Application>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ApplicationSpec,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApplicationSpec {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub source: Option<ApplicationSource>,
    #[serde(default)]
    pub sources: Option<Vec<ApplicationSource>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApplicationSource {
    #[serde(default, rename = "repoURL")]
    pub repo_url: String,
    #[serde(default, rename = "targetRevision")]
    pub target_revision: String,
}

impl ApplicationSpec {
    /// Returns the declared project, defaulting like the Argo CD API does.
    pub fn project(&self) -> &str {
        if self.project.is_empty() {
            DEFAULT_PROJECT
        } else {
            &self.project
        }
    }

    /// Returns the effective source: the first entry of a multi-source spec
    /// takes precedence over the single `source` field.
    pub fn effective_source(&self) -> Option<&ApplicationSource> {
        if let Some(sources) = &self.sources {
            if let Some(first) = sources.first() {
                return Some(first);
            }
        }
        self.source.as_ref()
    }

    /// Target revision of the effective source; empty when no source is set.
    pub fn target_revision(&self) -> &str {
        self.effective_source()
            .map(|source| source.target_revision.as_str())
            .unwrap_or("")
    }
}

/// Flattened view of an application, carrying exactly the attributes the
/// exporter republishes as metric labels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationRecord {
    pub namespace: String,
    pub name: String,
    pub project: String,
    pub revision: String,
}

impl Application {
    pub fn to_record(&self) -> ApplicationRecord {
        ApplicationRecord {
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
            project: self.spec.project().to_string(),
            revision: self.spec.target_revision().to_string(),
        }
    }
}
