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

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::problem::NewProblem;
use crate::types::problem::Problem;
use crate::types::problem::ProblemId;
use crate::types::problem::ProblemUpdate;
use crate::types::stats::Stats;

const SNAPSHOT_VERSION: u32 = 1;

/// The problem store: an ordered list of problems and an id counter, written
/// through to a snapshot file after every successful mutation.
///
/// Every operation, reads included, runs under one lock. Snapshot writes
/// happen while the lock is held, so a mutation and its write are atomic
/// with respect to every other operation.
pub struct ProblemStore {
    path: PathBuf,
    state: Mutex<Snapshot>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    version: u32,
    next_id: ProblemId,
    problems: Vec<Problem>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            next_id: 1,
            problems: Vec::new(),
        }
    }
}

impl ProblemStore {
    /// Open the store backed by the snapshot at `path`. A missing snapshot
    /// gives an empty store, and so does an unreadable one, after a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = if path.exists() {
            match load_snapshot(&path) {
                Ok(snapshot) => {
                    log::debug!(
                        "Loaded {} problems from {}.",
                        snapshot.problems.len(),
                        path.display()
                    );
                    snapshot
                }
                Err(e) => {
                    log::warn!("Could not load {}: {e}", path.display());
                    Snapshot::empty()
                }
            }
        } else {
            log::debug!("No snapshot at {}, starting empty.", path.display());
            Snapshot::empty()
        };
        Self {
            path,
            state: Mutex::new(snapshot),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a problem under the next id.
    pub fn add(&self, new: NewProblem) -> Fallible<Problem> {
        let mut state = self.acquire()?;
        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or_else(|| ErrorReport::new("problem id space exhausted"))?;
        let problem = new.into_problem(id);
        state.problems.push(problem.clone());
        self.persist(&state);
        Ok(problem)
    }

    /// A copy of every problem, in insertion order.
    pub fn list(&self) -> Fallible<Vec<Problem>> {
        let state = self.acquire()?;
        Ok(state.problems.clone())
    }

    pub fn find_by_id(&self, id: ProblemId) -> Fallible<Option<Problem>> {
        let state = self.acquire()?;
        Ok(state.problems.iter().find(|p| p.id == id).cloned())
    }

    /// Apply `update` to the problem with the given id. Returns the updated
    /// problem, or `None` if there is no such problem, in which case nothing
    /// is written.
    pub fn update(&self, id: ProblemId, update: ProblemUpdate) -> Fallible<Option<Problem>> {
        let mut state = self.acquire()?;
        let updated = match state.problems.iter_mut().find(|p| p.id == id) {
            Some(problem) => {
                update.apply(problem);
                problem.clone()
            }
            None => return Ok(None),
        };
        self.persist(&state);
        Ok(Some(updated))
    }

    /// Remove the problem with the given id. Returns whether it existed.
    pub fn delete(&self, id: ProblemId) -> Fallible<bool> {
        let mut state = self.acquire()?;
        let before = state.problems.len();
        state.problems.retain(|p| p.id != id);
        let removed = state.problems.len() != before;
        if removed {
            self.persist(&state);
        }
        Ok(removed)
    }

    pub fn stats(&self) -> Fallible<Stats> {
        let state = self.acquire()?;
        Ok(Stats::compute(&state.problems))
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Snapshot>> {
        self.state
            .lock()
            .map_err(|_| ErrorReport::new("problem store lock poisoned"))
    }

    /// Write the snapshot. Failures are logged and otherwise ignored: the
    /// in-memory state stays authoritative.
    fn persist(&self, snapshot: &Snapshot) {
        match save_snapshot(&self.path, snapshot) {
            Ok(()) => log::debug!("Wrote snapshot to {}.", self.path.display()),
            Err(e) => log::warn!("Could not save {}: {e}", self.path.display()),
        }
    }
}

fn load_snapshot(path: &Path) -> Fallible<Snapshot> {
    let text = fs::read_to_string(path)?;
    let mut snapshot: Snapshot = serde_json::from_str(&text)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ErrorReport::new(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }
    let mut seen: HashSet<ProblemId> = HashSet::new();
    for problem in &snapshot.problems {
        if problem.id == 0 {
            return fail("snapshot contains a problem with id 0");
        }
        if !seen.insert(problem.id) {
            return fail(format!("snapshot contains duplicate id {}", problem.id));
        }
    }
    // Never hand out id 0, or an id that is already taken.
    let floor = match seen.iter().max() {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| ErrorReport::new("problem id space exhausted"))?,
        None => 1,
    };
    snapshot.next_id = snapshot.next_id.max(floor);
    Ok(snapshot)
}

/// Write to a sibling temporary file, then rename it over the snapshot.
fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Fallible<()> {
    let text = serde_json::to_string_pretty(snapshot)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);
    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::helper::create_tmp_directory;

    fn titled(title: &str) -> NewProblem {
        NewProblem {
            title: title.to_string(),
            ..NewProblem::default()
        }
    }

    fn tmp_store() -> Fallible<ProblemStore> {
        let dir = create_tmp_directory()?;
        Ok(ProblemStore::open(dir.join("problems.json")))
    }

    #[test]
    fn test_ids_are_increasing() -> Fallible<()> {
        let store = tmp_store()?;
        let mut last = 0;
        for i in 0..10 {
            let problem = store.add(titled(&format!("P{i}")))?;
            assert!(problem.id > last);
            last = problem.id;
        }
        Ok(())
    }

    #[test]
    fn test_list_order_and_stats() -> Fallible<()> {
        let store = tmp_store()?;
        store.add(titled("A"))?;
        store.add(titled("B"))?;
        store.add(titled("C"))?;
        let problems = store.list()?;
        let titles: Vec<&str> = problems.iter().map(|p| p.title.as_str()).collect();
        let ids: Vec<ProblemId> = problems.iter().map(|p| p.id).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            store.stats()?,
            Stats {
                total: 3,
                pending: 3,
                easy: 3,
                ..Stats::default()
            }
        );
        Ok(())
    }

    #[test]
    fn test_find_by_id_after_add() -> Fallible<()> {
        let store = tmp_store()?;
        let new = NewProblem {
            title: "Valid Parentheses".to_string(),
            topic: "Stack".to_string(),
            difficulty: "Easy".to_string(),
            status: "Solved".to_string(),
            notes: "push opens, pop closes".to_string(),
            link: "https://example.com/valid-parentheses".to_string(),
        };
        let added = store.add(new.clone())?;
        let found = store.find_by_id(added.id)?;
        assert_eq!(found, Some(new.into_problem(added.id)));
        assert_eq!(store.find_by_id(999)?, None);
        Ok(())
    }

    #[test]
    fn test_update_field_groups() -> Fallible<()> {
        let store = tmp_store()?;
        store.add(titled("A"))?;
        store.add(titled("B"))?;
        store.add(titled("C"))?;
        let update = ProblemUpdate {
            title: Some("B2".to_string()),
            difficulty: Some(String::new()),
            status: Some(String::new()),
            notes: Some("updated".to_string()),
            link: Some(String::new()),
            topic: None,
        };
        let updated = store.update(2, update)?;
        let expected = Problem {
            id: 2,
            title: "B2".to_string(),
            topic: String::new(),
            difficulty: "Easy".to_string(),
            status: "Pending".to_string(),
            notes: "updated".to_string(),
            link: String::new(),
        };
        assert_eq!(updated, Some(expected.clone()));
        assert_eq!(store.find_by_id(2)?, Some(expected));
        Ok(())
    }

    #[test]
    fn test_update_missing() -> Fallible<()> {
        let store = tmp_store()?;
        assert_eq!(store.update(1, ProblemUpdate::default())?, None);
        // Nothing was written.
        assert!(!store.path().exists());
        Ok(())
    }

    #[test]
    fn test_delete_never_reuses_ids() -> Fallible<()> {
        let store = tmp_store()?;
        store.add(titled("A"))?;
        store.add(titled("B"))?;
        store.add(titled("C"))?;
        assert!(store.delete(2)?);
        assert!(!store.delete(2)?);
        let d = store.add(titled("D"))?;
        assert_eq!(d.id, 4);
        let ids: Vec<ProblemId> = store.list()?.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_list_is_a_copy() -> Fallible<()> {
        let store = tmp_store()?;
        store.add(titled("A"))?;
        let before = store.list()?;
        store.add(titled("B"))?;
        assert_eq!(before.len(), 1);
        assert_eq!(store.list()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_snapshot_survives_reopen() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        {
            let store = ProblemStore::open(&path);
            store.add(titled("A"))?;
            store.add(titled("B"))?;
            store.delete(2)?;
        }
        let store = ProblemStore::open(&path);
        let problems = store.list()?;
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].title, "A");
        // The counter is restored, so id 2 is not handed out again.
        assert_eq!(store.add(titled("C"))?.id, 3);
        Ok(())
    }

    #[test]
    fn test_missing_snapshot_is_empty() -> Fallible<()> {
        let store = tmp_store()?;
        assert!(store.list()?.is_empty());
        assert_eq!(store.stats()?, Stats::default());
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_is_empty() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(&path, "this is not a snapshot")?;
        let store = ProblemStore::open(&path);
        assert!(store.list()?.is_empty());
        assert_eq!(store.add(titled("A"))?.id, 1);
        Ok(())
    }

    #[test]
    fn test_unknown_version_is_empty() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(&path, r#"{"version":99,"nextId":5,"problems":[]}"#)?;
        let store = ProblemStore::open(&path);
        assert!(store.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_stale_counter_is_raised() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(
            &path,
            r#"{"version":1,"nextId":1,"problems":[{"id":7,"title":"A","topic":"","difficulty":"Easy","status":"Pending","notes":"","link":""}]}"#,
        )?;
        let store = ProblemStore::open(&path);
        assert_eq!(store.add(titled("B"))?.id, 8);
        Ok(())
    }

    #[test]
    fn test_zero_counter_is_raised() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(&path, r#"{"version":1,"nextId":0,"problems":[]}"#)?;
        let store = ProblemStore::open(&path);
        assert_eq!(store.add(titled("A"))?.id, 1);
        Ok(())
    }

    #[test]
    fn test_zero_id_is_corrupt() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(
            &path,
            r#"{"version":1,"nextId":5,"problems":[{"id":0,"title":"A"}]}"#,
        )?;
        let store = ProblemStore::open(&path);
        assert!(store.list()?.is_empty());
        assert_eq!(store.add(titled("B"))?.id, 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_ids_are_corrupt() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("problems.json");
        fs::write(
            &path,
            r#"{"version":1,"nextId":2,"problems":[{"id":1,"title":"A"},{"id":1,"title":"B"}]}"#,
        )?;
        let store = ProblemStore::open(&path);
        assert!(store.list()?.is_empty());
        assert_eq!(store.add(titled("C"))?.id, 1);
        Ok(())
    }

    #[test]
    fn test_failed_write_keeps_memory_state() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        // The snapshot path is a directory, so every write fails.
        let path = dir.join("problems.json");
        fs::create_dir(&path)?;
        fs::create_dir(dir.join("problems.json.tmp"))?;
        let store = ProblemStore::open(&path);
        let problem = store.add(titled("A"))?;
        assert_eq!(store.find_by_id(problem.id)?, Some(problem));
        Ok(())
    }

    #[test]
    fn test_concurrent_adds_get_distinct_ids() -> Fallible<()> {
        let store = Arc::new(tmp_store()?);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || -> Fallible<Vec<ProblemId>> {
                    let mut ids = Vec::new();
                    for i in 0..10 {
                        ids.push(store.add(titled(&format!("{t}-{i}")))?.id);
                    }
                    Ok(ids)
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            let result = handle
                .join()
                .map_err(|_| ErrorReport::new("thread panicked"))?;
            ids.extend(result?);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 80);
        assert_eq!(store.list()?.len(), 80);
        Ok(())
    }
}
