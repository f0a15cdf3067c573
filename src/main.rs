use clap::Parser;
use knotview::cli::{Cli, Command};
use knotview::{cmd_init, cmd_serve, cmd_shell};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Shell(args) => cmd_shell(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
