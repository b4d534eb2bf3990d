//! Interactive shell and script runner over the ledger.

mod context;
pub mod format;
mod handlers;
pub mod output;
pub mod registry;
mod shell;

pub use context::{CliError, CliMode, CommandError, CommandResult, ShellContext};
pub use shell::run_cli;
