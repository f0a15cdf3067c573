mod init;
mod serve;
mod shell;

pub use init::{cmd_init, cmd_init_with_fs};
pub use serve::cmd_serve;
pub use shell::{HELP, ShellCommand, cmd_shell, parse_command};
