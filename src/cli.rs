use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "knotview")]
#[command(about = "Explore class, package and jar dependency graphs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open an interactive view session against a backend or a fixture
    Shell(ShellArgs),

    /// Serve a fixture graph over the backend's HTTP interface
    Serve(ServeArgs),

    /// Generate a starter .knotview.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ShellArgs {
    /// Backend base URL (overrides .knotview.toml)
    #[arg(long, conflicts_with = "fixture")]
    pub backend: Option<String>,

    /// Answer requests from a fixture JSON file instead of a backend
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Directory to look for .knotview.toml in
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Fixture JSON file to serve
    #[arg(long)]
    pub fixture: PathBuf,

    /// Port for HTTP server
    #[arg(long, default_value = "4567")]
    pub port: u16,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .knotview.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_with_fixture() {
        let cli = Cli::try_parse_from(["knotview", "shell", "--fixture", "demo.json"]).unwrap();
        let Command::Shell(args) = cli.command else {
            panic!("expected shell");
        };
        assert_eq!(args.fixture, Some(PathBuf::from("demo.json")));
        assert!(args.backend.is_none());
    }

    #[test]
    fn test_backend_and_fixture_conflict() {
        let result = Cli::try_parse_from([
            "knotview",
            "shell",
            "--backend",
            "http://localhost:4567",
            "--fixture",
            "demo.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_defaults_to_backend_port() {
        let cli = Cli::try_parse_from(["knotview", "serve", "--fixture", "demo.json"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 4567);
        assert!(!args.open);
    }
}
