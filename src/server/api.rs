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

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

use crate::codec::encode_problem;
use crate::codec::encode_problems;
use crate::codec::parse_flat_object;
use crate::server::response::ApiError;
use crate::server::response::json_response;
use crate::server::state::ServerState;
use crate::types::problem::NewProblem;
use crate::types::problem::ProblemId;
use crate::types::problem::ProblemUpdate;

type ApiResult = Result<Response, ApiError>;

pub async fn list_handler(State(state): State<ServerState>) -> ApiResult {
    let problems = state.store.list()?;
    log::debug!("Listing {} problems", problems.len());
    Ok(json_response(StatusCode::OK, encode_problems(&problems)))
}

pub async fn add_handler(State(state): State<ServerState>, body: Bytes) -> ApiResult {
    let fields = decode_body(&body);
    let problem = state.store.add(new_problem(fields))?;
    log::debug!("Added problem {}", problem.id);
    Ok(json_response(StatusCode::CREATED, encode_problem(&problem)))
}

pub async fn get_handler(State(state): State<ServerState>, uri: Uri) -> ApiResult {
    let id = extract_id(uri.path())?;
    match state.store.find_by_id(id)? {
        Some(problem) => Ok(json_response(StatusCode::OK, encode_problem(&problem))),
        None => Err(ApiError::NotFound),
    }
}

pub async fn update_handler(
    State(state): State<ServerState>,
    uri: Uri,
    body: Bytes,
) -> ApiResult {
    let id = extract_id(uri.path())?;
    let fields = decode_body(&body);
    match state.store.update(id, problem_update(fields))? {
        Some(problem) => {
            log::debug!("Updated problem {id}");
            Ok(json_response(StatusCode::OK, encode_problem(&problem)))
        }
        None => Err(ApiError::NotFound),
    }
}

pub async fn delete_handler(State(state): State<ServerState>, uri: Uri) -> ApiResult {
    let id = extract_id(uri.path())?;
    if state.store.delete(id)? {
        log::debug!("Deleted problem {id}");
        let body = json!({ "message": "Problem deleted" }).to_string();
        Ok(json_response(StatusCode::OK, body))
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn stats_handler(State(state): State<ServerState>) -> ApiResult {
    let stats = state.store.stats()?;
    let body = serde_json::to_string(&stats).map_err(|e| ApiError::Internal(e.into()))?;
    Ok(json_response(StatusCode::OK, body))
}

/// CORS preflight.
pub async fn preflight_handler() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}

/// The id is the fourth `/`-separated segment: `/api/problems/{id}`.
fn extract_id(path: &str) -> Result<ProblemId, ApiError> {
    path.split('/')
        .nth(3)
        .and_then(|segment| segment.parse().ok())
        .ok_or(ApiError::InvalidId)
}

fn decode_body(body: &Bytes) -> HashMap<String, String> {
    parse_flat_object(&String::from_utf8_lossy(body))
}

/// Build a new problem from the request fields, filling in defaults for
/// whatever is absent.
fn new_problem(mut fields: HashMap<String, String>) -> NewProblem {
    let defaults = NewProblem::default();
    NewProblem {
        title: fields.remove("title").unwrap_or(defaults.title),
        topic: fields.remove("topic").unwrap_or(defaults.topic),
        difficulty: fields.remove("difficulty").unwrap_or(defaults.difficulty),
        status: fields.remove("status").unwrap_or(defaults.status),
        notes: fields.remove("notes").unwrap_or(defaults.notes),
        link: fields.remove("link").unwrap_or(defaults.link),
    }
}

fn problem_update(mut fields: HashMap<String, String>) -> ProblemUpdate {
    ProblemUpdate {
        title: fields.remove("title"),
        topic: fields.remove("topic"),
        difficulty: fields.remove("difficulty"),
        status: fields.remove("status"),
        notes: fields.remove("notes"),
        link: fields.remove("link"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_id() {
        assert_eq!(extract_id("/api/problems/12").ok(), Some(12));
        assert_eq!(extract_id("/api/problems/12/extra").ok(), Some(12));
        assert!(matches!(extract_id("/api/problems"), Err(ApiError::InvalidId)));
        assert!(matches!(extract_id("/api/problems/"), Err(ApiError::InvalidId)));
        assert!(matches!(extract_id("/api/problems/abc"), Err(ApiError::InvalidId)));
        assert!(matches!(extract_id("/api/problems/-1"), Err(ApiError::InvalidId)));
    }

    #[test]
    fn test_new_problem_defaults() {
        let fields = parse_flat_object(r#"{"title":"A"}"#);
        let new = new_problem(fields);
        assert_eq!(new.title, "A");
        assert_eq!(new.topic, "");
        assert_eq!(new.difficulty, "Easy");
        assert_eq!(new.status, "Pending");
    }

    #[test]
    fn test_problem_update_keeps_absent_fields_absent() {
        let fields = parse_flat_object(r#"{"notes":"","status":"Solved"}"#);
        let update = problem_update(fields);
        assert_eq!(
            update,
            ProblemUpdate {
                notes: Some(String::new()),
                status: Some("Solved".to_string()),
                ..ProblemUpdate::default()
            }
        );
    }
}
