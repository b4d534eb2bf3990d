//! Shell state, dispatch, and error reporting.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use once_cell::sync::Lazy;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    errors::LedgerError,
    ledger::Ledger,
    storage::JsonFileStore,
};

use super::{handlers, output, registry::CommandRegistry};

static REGISTRY: Lazy<CommandRegistry> = Lazy::new(handlers::build_registry);

const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Errors that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by a single command; the shell reports them and keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub fn usage(message: impl Into<String>) -> Self {
        CommandError::InvalidArguments(message.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub(crate) ledger: Ledger,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
}

impl ShellContext {
    /// Opens the configured data file under the application directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                output::warning(format!(
                    "Could not read {} ({err}); using default settings.",
                    config_manager.path().display()
                ));
                Config::default()
            }
        };
        let data_file = config.resolve_data_file(config_manager.base_dir());
        tracing::debug!(path = %data_file.display(), "opening ledger");
        let ledger = Ledger::open(Box::new(JsonFileStore::new(data_file)));
        Ok(Self::with_ledger(ledger, config, config_manager, mode))
    }

    pub fn with_ledger(
        ledger: Ledger,
        config: Config,
        config_manager: ConfigManager,
        mode: CliMode,
    ) -> Self {
        Self {
            ledger,
            config,
            config_manager,
            mode,
            running: true,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn registry(&self) -> &'static CommandRegistry {
        &REGISTRY
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry().names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        if self.ledger.has_unsaved_changes() {
            "money*> ".into()
        } else {
            "money> ".into()
        }
    }

    pub(crate) fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    /// Tokenises and runs one input line. Lines starting with `#` are comments.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        if raw.starts_with('#') {
            return Ok(LoopControl::Continue);
        }
        let command = raw.to_lowercase();
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.dispatch(&command, &args)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(entry) = self.registry().get(command) else {
            self.suggest_command(command);
            return Ok(LoopControl::Continue);
        };
        match (entry.handler)(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        if let Some(name) = closest_command(self.registry().names(), input) {
            output::info(format!("Did you mean `{}`?", name));
        }
    }

    /// Asks for confirmation interactively; script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(
                LedgerError::Persistence(message) | LedgerError::Unsaved { reason: message, .. },
            ) => {
                output::warning(format!(
                    "Change kept in memory but not saved: {message}. It will be written with the next change."
                ));
            }
            other => output::error(other),
        }
    }
}

/// Nearest name within the suggestion distance; ties go to the name that
/// sorts first.
fn closest_command<'a>(names: impl Iterator<Item = &'a str>, input: &str) -> Option<&'a str> {
    names
        .map(|name| (levenshtein(name, input), name))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min()
        .map(|(_, name)| name)
}
