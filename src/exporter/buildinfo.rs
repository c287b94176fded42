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

//! Build metadata reported by `--version` and at startup.

/// Returns a one-line description of this build.
///
/// The commit hash is injected by CI through the `BUILD_GIT_COMMIT`
/// environment variable and is omitted for local builds.
pub fn version() -> String {
    let mut info = format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if let Some(commit) = option_env!("BUILD_GIT_COMMIT") {
        info.push_str(" (");
        info.push_str(commit);
        info.push(')');
    }
    info
}
