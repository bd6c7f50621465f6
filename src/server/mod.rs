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

mod api;
mod assets;
mod response;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware::map_response;
use axum::routing::MethodRouter;
use axum::routing::get;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::Fallible;
use crate::server::api::add_handler;
use crate::server::api::delete_handler;
use crate::server::api::get_handler;
use crate::server::api::list_handler;
use crate::server::api::method_not_allowed_handler;
use crate::server::api::preflight_handler;
use crate::server::api::stats_handler;
use crate::server::api::update_handler;
use crate::server::assets::static_handler;
use crate::server::response::with_cors_headers;
use crate::server::state::ServerState;
use crate::static_files::StaticFiles;
use crate::store::ProblemStore;

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let files = StaticFiles::new(&config.frontend_dir)?;
    log::info!("Serving frontend from {}", files.root().display());

    let store = ProblemStore::open(&config.data_file);
    log::info!("Using snapshot {}", store.path().display());

    let state = ServerState {
        store: Arc::new(store),
        files: Arc::new(files),
    };
    let app = router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bind = listener.local_addr()?;
    log::info!("Starting server on http://{bind}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped.");
    Ok(())
}

fn router(state: ServerState) -> Router {
    // PUT and DELETE without an id are wired so they fail as a bad id.
    let collection: MethodRouter<ServerState> = get(list_handler)
        .post(add_handler)
        .put(update_handler)
        .delete(delete_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed_handler);
    let api = Router::new();
    let api = api.route("/api/problems", collection);
    let api = api.route("/api/problems/", member_routes());
    let api = api.route("/api/problems/{*rest}", member_routes());
    let api = api.route(
        "/api/stats",
        get(stats_handler)
            .options(preflight_handler)
            .fallback(method_not_allowed_handler),
    );
    let api = api.layer(map_response(with_cors_headers));
    let app = Router::new();
    let app = app.merge(api);
    let app = app.fallback(static_handler);
    app.with_state(state)
}

fn member_routes() -> MethodRouter<ServerState> {
    get(get_handler)
        .put(update_handler)
        .delete(delete_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed_handler)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down.");
}
