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

//! The wire codec for request and response bodies.
//!
//! Decoding is deliberately lenient and only understands flat objects whose
//! values are strings: `{"key":"value",...}`. Anything else decodes to an
//! empty map and the caller falls back to defaults. Decoding does not
//! unescape `\"` or `\\`, while encoding does escape them, so text containing
//! those characters does not survive a round trip unchanged.

use std::collections::HashMap;

use crate::types::problem::Problem;

/// Decode a flat JSON object into a map of strings.
///
/// Line breaks are dropped first, so a pretty-printed body parses the same
/// as a compact one.
pub fn parse_flat_object(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let body: String = body.lines().collect();
    let body = body.trim();
    let Some(inner) = body
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return fields;
    };
    for member in split_members(inner) {
        if let Some((key, value)) = member.split_once(':') {
            fields.insert(unquote(key.trim()), unquote(value.trim()));
        }
    }
    fields
}

/// Split the inside of an object on commas that are not inside a
/// double-quoted segment. Escaped quotes are not recognised.
fn split_members(inner: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                members.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    members.push(&inner[start..]);
    members
}

/// Strip at most one leading and one trailing double quote.
fn unquote(text: &str) -> String {
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);
    text.to_string()
}

/// Escape a string for use inside a JSON string literal.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Encode a problem as a flat object. Field order is fixed.
pub fn encode_problem(problem: &Problem) -> String {
    format!(
        r#"{{"id":{},"title":"{}","topic":"{}","difficulty":"{}","status":"{}","notes":"{}","link":"{}"}}"#,
        problem.id,
        escape(&problem.title),
        escape(&problem.topic),
        escape(&problem.difficulty),
        escape(&problem.status),
        escape(&problem.notes),
        escape(&problem.link),
    )
}

/// Encode a sequence of problems as a JSON array, preserving order.
pub fn encode_problems(problems: &[Problem]) -> String {
    let items: Vec<String> = problems.iter().map(encode_problem).collect();
    format!("[{}]", items.join(","))
}
