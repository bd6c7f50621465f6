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

use serde::Serialize;

use crate::types::problem::Problem;

/// Aggregate counts over the whole store. Labels are matched
/// case-insensitively; problems with any other label only count towards
/// `total`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub solved: usize,
    pub attempted: usize,
    pub pending: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl Stats {
    pub fn compute(problems: &[Problem]) -> Self {
        let count_status = |label: &str| {
            problems
                .iter()
                .filter(|p| p.status.eq_ignore_ascii_case(label))
                .count()
        };
        let count_difficulty = |label: &str| {
            problems
                .iter()
                .filter(|p| p.difficulty.eq_ignore_ascii_case(label))
                .count()
        };
        Self {
            total: problems.len(),
            solved: count_status("Solved"),
            attempted: count_status("Attempted"),
            pending: count_status("Pending"),
            easy: count_difficulty("Easy"),
            medium: count_difficulty("Medium"),
            hard: count_difficulty("Hard"),
        }
    }
}
