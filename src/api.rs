//! Library entry points for embedding the viewer.
//!
//! The CLI commands print and return exit codes; these functions return
//! `Result`s instead.
//!
//! # Example
//!
//! ```no_run
//! use knotview::{ViewOptions, load_view, open_fixture};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), knotview::KnotviewError> {
//! let backend = open_fixture(Path::new("demos/sample.json"))?;
//! let state = load_view(backend, ViewOptions::default()).await;
//! println!("{} nodes", state.snapshot.nodes.len());
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, ConfigError};
use crate::controller::{GraphViewController, ViewOptions};
use crate::fixture::{FixtureBackend, FixtureError};
use crate::fs::default_fs;
use crate::render::TerminalSurface;
use crate::service::{GraphService, HttpGraphService, ServiceError};
use crate::session::Session;
use crate::state::ViewState;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnotviewError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("Backend error: {0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads `.knotview.toml` from `dir`, or defaults if there is none.
pub fn load_config(dir: &Path) -> Result<Config, KnotviewError> {
    Ok(Config::load(dir)?)
}

pub fn open_fixture(path: &Path) -> Result<FixtureBackend, KnotviewError> {
    Ok(FixtureBackend::load(path, default_fs())?)
}

/// HTTP client for the backend described by `config`.
pub fn connect(config: &Config) -> Result<HttpGraphService, KnotviewError> {
    Ok(HttpGraphService::new(
        &config.backend.url,
        config.backend.timeout,
    )?)
}

/// Runs the startup fetches to completion without drawing anything and
/// returns the resulting view state. Failed fetches show up as notifications.
pub async fn load_view<S: GraphService + 'static>(service: S, options: ViewOptions) -> ViewState {
    let controller = GraphViewController::new(TerminalSurface::new(std::io::sink()), options);
    let mut session = Session::new(service, controller);
    session.start();
    session.settle().await;
    session.controller().state().clone()
}
