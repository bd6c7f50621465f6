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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FILE: &str = "problems.json";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    /// Relative paths are resolved against the working directory.
    pub frontend_dir: PathBuf,
}

/// A partial set of settings, as read from a config file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_file: Option<PathBuf>,
    pub frontend_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("config file {} does not exist.", path.display()));
        }
        let content = read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Fill in anything unset from `other`.
    pub fn or(self, other: Settings) -> Settings {
        Settings {
            host: self.host.or(other.host),
            port: self.port.or(other.port),
            data_file: self.data_file.or(other.data_file),
            frontend_dir: self.frontend_dir.or(other.frontend_dir),
        }
    }
}

impl ServerConfig {
    /// Command-line settings win over the config file, which wins over the
    /// defaults.
    pub fn resolve(cli: Settings, config_file: Option<&Path>) -> Fallible<Self> {
        let file = match config_file {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        let settings = cli.or(file);
        Ok(Self {
            host: settings.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: settings.port.unwrap_or(DEFAULT_PORT),
            data_file: settings
                .data_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            frontend_dir: settings
                .frontend_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_DIR)),
        })
    }
}
