//! HTTP surface for devreload.
//!
//! This crate provides:
//! - a status endpoint returning the current reload signal as plain text
//! - a middleware injecting the polling script into HTML responses
//! - a static file development server wiring both to a [`FileWatcher`]
//!
//! Hosts with their own axum application only need [`LiveReload::attach`];
//! [`run_server`] is the bundled server used by the `devreload` CLI.
//!
//! # Architecture
//!
//! ```text
//! Browser ──poll──► GET /dev/reload-check ──► ReloadSignal::current()
//!    ▲                                              ▲
//!    │                                              │ trigger()
//!    └── HTML + injected <script> ◄── ServeDir      │
//!                                              FileWatcher ◄── notify
//! ```
//!
//! [`FileWatcher`]: devreload_core::FileWatcher

mod app;
mod error;
mod handlers;
mod middleware;
mod script;
mod state;
mod static_files;

use std::path::PathBuf;

use devreload_core::{FileWatcher, ReloadSignal};

pub use error::ServerError;
pub use middleware::inject::inject_script;
pub use script::{POLL_INTERVAL_MS, render_script, render_script_tag};
pub use state::{InjectionPolicy, LiveReload};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory of static files to serve.
    pub root: PathBuf,
    /// Enable live reload (watcher and script injection).
    pub live_reload_enabled: bool,
    /// Path of the reload status endpoint.
    pub status_path: String,
    /// Directories to watch.
    pub watch_paths: Vec<PathBuf>,
    /// Extensions that trigger a reload.
    pub extensions: Vec<String>,
    /// Inject into responses without a `Content-Type` header.
    pub inject_without_content_type: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
            root: PathBuf::from("public"),
            live_reload_enabled: true,
            status_path: devreload_config::DEFAULT_STATUS_PATH.to_owned(),
            watch_paths: vec![PathBuf::from("public")],
            extensions: vec!["html".to_owned(), "css".to_owned(), "js".to_owned()],
            inject_without_content_type: true,
        }
    }
}

/// Run the development server until Ctrl-C.
///
/// Starts the file watcher before binding (when live reload is enabled) and
/// stops it once the server has shut down. `signal` is shared with the
/// caller so it can trigger reloads by hand.
///
/// # Errors
///
/// Returns an error if a watch path cannot be observed or the server fails to
/// bind.
pub async fn run_server(config: ServerConfig, signal: ReloadSignal) -> Result<(), ServerError> {
    let watcher = FileWatcher::new(signal.clone());

    let live_reload = if config.live_reload_enabled {
        watcher.start(config.watch_paths.iter().cloned(), &config.extensions)?;
        Some(LiveReload::with_policy(
            signal,
            config.status_path.clone(),
            InjectionPolicy {
                inject_without_content_type: config.inject_without_content_type,
            },
        ))
    } else {
        None
    };

    let app = app::create_router(&config.root, live_reload.as_ref());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, root = %config.root.display(), "Starting server");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    watcher.stop();
    result?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from a loaded devreload config.
#[must_use]
pub fn server_config_from_config(config: &devreload_config::Config) -> ServerConfig {
    let live_reload = &config.live_reload_resolved;

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.serve_resolved.root.clone(),
        live_reload_enabled: live_reload.enabled,
        status_path: live_reload.status_path.clone(),
        watch_paths: config.watch_paths(),
        extensions: live_reload.extensions.clone(),
        inject_without_content_type: live_reload.inject_without_content_type,
    }
}
