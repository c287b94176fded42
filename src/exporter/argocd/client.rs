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
use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use reqwest::tls::{Certificate, Identity};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::exporter::argocd::credentials::{ClusterAuth, ClusterCredentials};
use crate::exporter::argocd::types::{Application, ApplicationList, ApplicationRecord};
use crate::exporter::refresh::ApplicationLister;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const APPLICATIONS_GROUP: &str = "argoproj.io";
const APPLICATIONS_VERSION: &str = "v1alpha1";

#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl Error for HttpError {}

/// Read-only client listing Argo CD applications through the Kubernetes
/// aggregated API.
#[derive(Clone)]
pub struct ArgoClient {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl ArgoClient {
    pub fn new(credentials: ClusterCredentials) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let base_url = Url::parse(&credentials.server)?;

        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT).http1_only();

        if let Some(bytes) = credentials.ca_bundle.as_deref() {
            let ca_certificate = Certificate::from_pem(bytes)?;
            builder = builder.add_root_certificate(ca_certificate);
        }

        let bearer_token = match &credentials.auth {
            ClusterAuth::BearerToken(token) => Some(token.clone()),
            ClusterAuth::ClientCertificate { identity_pem } => {
                let identity = Identity::from_pem(identity_pem).map_err(|err| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("malformed client identity: {err}"),
                    )
                })?;
                builder = builder.identity(identity);
                None
            }
        };

        let client = builder.build().map_err(|err| {
            io::Error::other(format!("failed to construct Kubernetes HTTP client: {err}"))
        })?;

        Ok(ArgoClient {
            client,
            base_url,
            bearer_token,
        })
    }

    fn url_from_segments(&self, segments: &[&str]) -> Result<Url, Box<dyn Error + Send + Sync>> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| "base URL cannot be base for segments")?;
            parts.clear();
            for segment in segments {
                if !segment.is_empty() {
                    parts.push(segment);
                }
            }
        }
        Ok(url)
    }

    fn applications_url(&self, namespace: Option<&str>) -> Result<Url, Box<dyn Error + Send + Sync>> {
        let mut segments = vec!["apis", APPLICATIONS_GROUP, APPLICATIONS_VERSION];
        if let Some(ns) = namespace.filter(|s| !s.is_empty()) {
            segments.push("namespaces");
            segments.push(ns);
        }
        segments.push("applications");
        self.url_from_segments(&segments)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Box<dyn Error + Send + Sync>>
    where
        T: DeserializeOwned,
    {
        let response = self.apply_auth(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text
            };
            return Err(Box::new(HttpError::new(status, message)));
        }
        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Lists applications, flattened to the attributes the exporter
    /// republishes. `None` fetches across all namespaces.
    pub async fn list(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<ApplicationRecord>, Box<dyn Error + Send + Sync>> {
        let url = self.applications_url(namespace)?;
        let request = self.client.get(url);
        let list: ApplicationList = self.send_json(request).await?;
        Ok(list.items.iter().map(Application::to_record).collect())
    }
}

impl ApplicationLister for ArgoClient {
    fn list_applications(
        &self,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, Box<dyn Error + Send + Sync>>> + Send
    {
        self.list(namespace)
    }
}
