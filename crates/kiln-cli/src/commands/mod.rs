//! Subcommand handlers. Each module exposes one `execute` function.

pub mod generate;
pub mod init;
