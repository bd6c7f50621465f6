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

use serde::Deserialize;
use serde::Serialize;

pub type ProblemId = u32;

pub const DEFAULT_DIFFICULTY: &str = "Easy";
pub const DEFAULT_STATUS: &str = "Pending";

/// A tracked practice problem.
///
/// `difficulty` and `status` are free text. The conventional values are
/// `Easy`/`Medium`/`Hard` and `Pending`/`Attempted`/`Solved`, but nothing
/// enforces them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub link: String,
}

/// The fields of a problem that does not have an id yet. Defaults for absent
/// fields are applied before one of these is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProblem {
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub status: String,
    pub notes: String,
    pub link: String,
}

impl NewProblem {
    pub fn into_problem(self, id: ProblemId) -> Problem {
        Problem {
            id,
            title: self.title,
            topic: self.topic,
            difficulty: self.difficulty,
            status: self.status,
            notes: self.notes,
            link: self.link,
        }
    }
}

impl Default for NewProblem {
    fn default() -> Self {
        Self {
            title: String::new(),
            topic: String::new(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            status: DEFAULT_STATUS.to_string(),
            notes: String::new(),
            link: String::new(),
        }
    }
}

/// A partial update. `None` leaves a field alone.
///
/// The two field groups behave differently: an empty `title`, `topic`,
/// `difficulty` or `status` is also ignored, while an empty `notes` or `link`
/// clears the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
}

impl ProblemUpdate {
    pub fn apply(self, problem: &mut Problem) {
        overwrite_if_non_empty(&mut problem.title, self.title);
        overwrite_if_non_empty(&mut problem.topic, self.topic);
        overwrite_if_non_empty(&mut problem.difficulty, self.difficulty);
        overwrite_if_non_empty(&mut problem.status, self.status);
        if let Some(notes) = self.notes {
            problem.notes = notes;
        }
        if let Some(link) = self.link {
            problem.link = link;
        }
    }
}

fn overwrite_if_non_empty(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            *field = value;
        }
    }
}
