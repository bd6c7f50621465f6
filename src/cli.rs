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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::cmd::export::export_problems;
use crate::cmd::stats::print_stats;
use crate::config::DEFAULT_DATA_FILE;
use crate::config::ServerConfig;
use crate::config::Settings;
use crate::error::Fallible;
use crate::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Defaults to `serve`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API and frontend server.
    Serve(ServeArgs),
    /// Print statistics for a snapshot.
    Stats {
        /// Path to the snapshot file.
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data_file: PathBuf,
    },
    /// Print every problem in a snapshot as JSON.
    Export {
        /// Path to the snapshot file.
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data_file: PathBuf,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Optional path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to bind to.
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,
    /// Path to the snapshot file.
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// Path to the frontend directory.
    #[arg(long)]
    frontend: Option<PathBuf>,
}

impl Cli {
    fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    match cli.into_command() {
        Command::Serve(args) => {
            let settings = Settings {
                host: args.host,
                port: args.port,
                data_file: args.data_file,
                frontend_dir: args.frontend,
            };
            let config = ServerConfig::resolve(settings, args.config.as_deref())?;
            start_server(config).await
        }
        Command::Stats { data_file } => print_stats(&data_file),
        Command::Export { data_file } => export_problems(&data_file),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_serve() {
        let cli = Cli::try_parse_from(["dsatracker"]);
        match cli.map(Cli::into_command) {
            Ok(Command::Serve(args)) => {
                assert_eq!(args.config, None);
                assert_eq!(args.host, None);
                assert_eq!(args.port, None);
                assert_eq!(args.data_file, None);
                assert_eq!(args.frontend, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["dsatracker", "serve", "--port", "9000"]);
        match cli.map(Cli::into_command) {
            Ok(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.host, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_stats_default_file() {
        let cli = Cli::try_parse_from(["dsatracker", "stats"]);
        match cli.map(Cli::into_command) {
            Ok(Command::Stats { data_file }) => {
                assert_eq!(data_file, PathBuf::from("problems.json"));
            }
            _ => panic!("expected stats"),
        }
    }
}
