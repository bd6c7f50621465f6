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

use std::path::Path;

use crate::error::Fallible;
use crate::error::fail;
use crate::store::ProblemStore;
use crate::types::stats::Stats;

pub fn print_stats(data_file: &Path) -> Fallible<()> {
    let stats = snapshot_stats(data_file)?;
    let stats_json = serde_json::to_string_pretty(&stats)?;
    println!("{stats_json}");
    Ok(())
}

fn snapshot_stats(data_file: &Path) -> Fallible<Stats> {
    if !data_file.exists() {
        return fail("data file does not exist.");
    }
    let store = ProblemStore::open(data_file);
    store.stats()
}
