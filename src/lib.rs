pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod fixture;
pub mod fs;
pub mod model;
pub mod present;
pub mod render;
pub mod request;
pub mod service;
pub mod session;
pub mod state;
pub mod style;

pub use api::{KnotviewError, connect, load_config, load_view, open_fixture};
pub use cli::Cli;
pub use commands::{cmd_init, cmd_serve, cmd_shell};
pub use config::Config;
pub use controller::{GraphViewController, ViewOptions};
pub use session::Session;
pub use state::ViewState;
