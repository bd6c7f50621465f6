// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Fallible;
use crate::error::fail;

/// Serves files from the frontend root directory.
///
/// Request paths come straight from the client, so every resolved path is
/// checked to stay inside the root, both lexically and after symbolic links
/// are resolved.
pub struct StaticFiles {
    /// Canonical path to the frontend root directory.
    root: PathBuf,
}

/// Errors that can occur when resolving a request path.
#[derive(Debug, PartialEq)]
pub enum StaticError {
    /// Path resolves outside the root directory.
    Forbidden,
    /// File does not exist, or is not a regular file.
    NotFound,
}

impl StaticFiles {
    /// Construct a new [`StaticFiles`]. The root must exist.
    pub fn new(root: &Path) -> Fallible<Self> {
        if !root.is_dir() {
            return fail("frontend directory does not exist.");
        }
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a (percent-decoded) URL path to a file under the root.
    ///
    /// `/` maps to `/index.html`.
    pub fn resolve(&self, url_path: &str) -> Result<PathBuf, StaticError> {
        let url_path = if url_path == "/" {
            "/index.html"
        } else {
            url_path
        };
        let relative = url_path.strip_prefix('/').unwrap_or(url_path);

        // Fold the path lexically first, so that `..` cannot climb above the
        // root even when the target does not exist.
        let mut folded = PathBuf::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => folded.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !folded.pop() {
                        return Err(StaticError::Forbidden);
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(StaticError::Forbidden);
                }
            }
        }

        let full_path = self.root.join(folded);
        if !full_path.exists() {
            return Err(StaticError::NotFound);
        }

        // Resolve symbolic links and check again.
        let canonical = full_path
            .canonicalize()
            .map_err(|_| StaticError::NotFound)?;
        if !canonical.starts_with(&self.root) {
            return Err(StaticError::Forbidden);
        }
        if !canonical.is_file() {
            return Err(StaticError::NotFound);
        }
        Ok(canonical)
    }
}

/// The content type for a file, from its extension.
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        Some("webp") => "image/webp",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
