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

use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use percent_encoding::percent_decode_str;

use crate::server::state::ServerState;
use crate::static_files::StaticError;
use crate::static_files::content_type;

/// Fallback for every non-API path: serve a file from the frontend root.
pub async fn static_handler(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD && method != Method::OPTIONS {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }
    let path = match percent_decode_str(uri.path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => return not_found(),
    };
    match state.files.resolve(&path) {
        Ok(file) => match tokio::fs::read(&file).await {
            Ok(bytes) => {
                (StatusCode::OK, [(CONTENT_TYPE, content_type(&file))], bytes).into_response()
            }
            Err(e) => {
                log::warn!("Could not read {}: {e}", file.display());
                not_found()
            }
        },
        Err(StaticError::Forbidden) => {
            log::warn!("Rejected path outside the frontend root: {path}");
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
        Err(StaticError::NotFound) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
