//! The menu run loop.
//!
//! One iteration renders the menu, reads a selection, collects prompt answers,
//! invokes the chosen action and renders its result. Every recoverable error
//! is printed as a notice and leads back to the menu; only terminal failures,
//! end of input and Ctrl-C leave the loop early.

use super::config::MenuConfig;
use crate::error::{MenuError, Result};
use crate::models::{Action, Arguments, DisplayMode, Handler, PromptSpec};
use crate::render::{
    display_text, field_count, is_empty_result, render_table, table_records, NO_DATA,
};
use crate::terminal::{read_cancelable, Terminal};
use colored::Colorize;
use serde_json::Value;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Warning,
    Error,
}

/// Parses a 1-based menu selection into an index into the action list.
///
/// The input (ignoring surrounding whitespace) must be all decimal digits and
/// name an entry in `1..=count`.
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    let trimmed = input.trim();
    let invalid = || MenuError::InvalidSelection {
        input: input.to_string(),
        max: count,
    };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match trimmed.parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Ok(choice - 1),
        _ => Err(invalid()),
    }
}

thread_local! {
    /// Set while this thread runs an action under `catch_unwind`.
    static CONTAINING_PANIC: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the current panic hook so it stays silent for panics the engine
/// catches; every other panic is reported as before.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CONTAINING_PANIC.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Calls a user action, turning both returned errors and panics into
/// `MenuError::ActionExecution`.
///
/// A panic's message ends up in the notice, so the panic hook is kept quiet
/// for the duration of the call instead of writing over the menu.
fn invoke(action: &Action, args: &Arguments) -> Result<Value> {
    let Handler::User(callable) = &action.handler else {
        return Ok(Value::Null);
    };

    install_quiet_hook();
    CONTAINING_PANIC.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callable(args)));
    CONTAINING_PANIC.with(|flag| flag.set(false));
    let message = match outcome {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => format!("{:#}", err),
        Err(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                format!("panicked: {}", s)
            } else if let Some(s) = payload.downcast_ref::<String>() {
                format!("panicked: {}", s)
            } else {
                "panicked".to_string()
            }
        },
    };
    Err(MenuError::ActionExecution {
        label: action.label.clone(),
        message,
    })
}

/// Numbered console menu over a list of actions.
///
/// The engine owns its actions and the terminal it talks to. A synthetic
/// "Exit" entry is always appended last; choosing it stops [`MenuEngine::run`].
pub struct MenuEngine<T: Terminal> {
    config: MenuConfig,
    actions: Vec<Action>,
    terminal: T,
    running: bool,
}

impl<T: Terminal> MenuEngine<T> {
    /// Creates an engine with default presentation settings and the given title.
    pub fn new(title: impl Into<String>, actions: Vec<Action>, terminal: T) -> Result<Self> {
        Self::with_config(MenuConfig::new(title), actions, terminal)
    }

    /// Creates an engine, validating every action before anything is rendered.
    pub fn with_config(config: MenuConfig, mut actions: Vec<Action>, terminal: T) -> Result<Self> {
        for action in &actions {
            action.validate()?;
        }
        actions.push(Action::exit());
        debug!(count = actions.len(), "Menu engine created");

        Ok(Self {
            config,
            actions,
            terminal,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Labels in menu order, ending with "Exit".
    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(Action::label).collect()
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    /// Stops the loop before its next iteration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Runs the menu until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::Io` if the terminal fails. Ctrl-C and end of input
    /// stop the session and return `Ok`.
    pub fn run(&mut self) -> Result<()> {
        info!(title = %self.config.title, entries = self.actions.len(), "Menu started");

        while self.running {
            match self.step() {
                Ok(()) => {},
                Err(MenuError::EndOfInput) => {
                    info!("Input ended, leaving menu");
                    self.running = false;
                },
                Err(MenuError::Interrupted) => {
                    info!("Interrupted, leaving menu");
                    writeln!(self.terminal.writer(), "{}", MenuError::Interrupted)?;
                    self.running = false;
                },
                Err(err) => return Err(err),
            }
        }

        self.terminal.writer().flush()?;
        info!("Menu stopped");
        Ok(())
    }

    /// One pass of the loop: menu, selection, and handling of the selection.
    fn step(&mut self) -> Result<()> {
        let subtitle = self.config.subtitle.clone();
        self.render_header(&subtitle)?;
        self.render_entries()?;

        let out = self.terminal.writer();
        write!(out, "Select an option by number: ")?;
        out.flush()?;
        let input = self.terminal.read_line()?.ok_or(MenuError::EndOfInput)?;

        match parse_selection(&input, self.actions.len()) {
            Ok(index) => self.handle_selection(index),
            Err(err) => {
                warn!(input = %input, "Invalid selection");
                self.notice(Severity::Warning, &err)?;
                self.render_footer()
            },
        }
    }

    fn handle_selection(&mut self, index: usize) -> Result<()> {
        let action = &self.actions[index];
        let label = action.label.clone();
        debug!(index, label = %label, "Selected");

        if action.is_exit() {
            self.render_header(&label)?;
            writeln!(self.terminal.writer(), "Exiting Program!")?;
            self.running = false;
            return Ok(());
        }

        let prompts = action.prompts.clone();
        let display = action.display.clone();

        let prompted = match self.collect_prompts(&label, &prompts) {
            Ok(values) => values,
            Err(err) if err.is_recoverable() => {
                if !matches!(err, MenuError::PromptCancelled) {
                    warn!(label = %label, %err, "Prompt rejected");
                    self.notice(Severity::Warning, &err)?;
                }
                return self.render_footer();
            },
            Err(err) => return Err(err),
        };

        let args = self.actions[index].arguments(prompted);
        self.render_header(&label)?;
        info!(label = %label, positional = args.len(), "Invoking action");

        match invoke(&self.actions[index], &args) {
            Ok(value) => self.render_result(&display, value)?,
            Err(err) => {
                warn!(%err, "Action failed");
                self.notice(Severity::Error, &err)?;
            },
        }

        if self.running {
            self.render_footer()?;
        }
        Ok(())
    }

    /// Asks every prompt in order; the first cancel or bad answer abandons the lot.
    fn collect_prompts(&mut self, label: &str, prompts: &[PromptSpec]) -> Result<Vec<Value>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }

        self.render_header(label)?;
        writeln!(self.terminal.writer(), "Press ESC to cancel and go back . . .")?;
        writeln!(self.terminal.writer())?;

        let mut values = Vec::with_capacity(prompts.len());
        for spec in prompts {
            let raw = read_cancelable(&mut self.terminal, &format!("{}: ", spec.text))?;
            values.push(spec.kind.convert(&raw)?);
        }
        Ok(values)
    }

    fn render_result(&mut self, display: &DisplayMode, value: Value) -> Result<()> {
        if is_empty_result(&value) {
            writeln!(self.terminal.writer(), "{}", NO_DATA)?;
            return Ok(());
        }

        match display {
            DisplayMode::Scalar => {
                writeln!(self.terminal.writer(), "{}", display_text(&value))?;
            },
            DisplayMode::Table(columns) => {
                let records = table_records(value);
                let found = records.first().map(field_count).unwrap_or_default();
                if found != columns.len() {
                    let err = MenuError::TableShapeMismatch {
                        expected: columns.len(),
                        found,
                    };
                    warn!(%err, "Table not rendered");
                    return self.notice(Severity::Error, &err);
                }
                let width = self.config.column_width;
                render_table(self.terminal.writer(), &records, columns, width)?;
            },
        }
        Ok(())
    }

    fn render_header(&mut self, subtitle: &str) -> Result<()> {
        self.terminal.clear()?;
        let width = self.config.rule_width;
        let rule = "=".repeat(width);
        let title = format!("{:^width$}", self.config.title, width = width);
        let title = if self.config.color {
            title.bold().to_string()
        } else {
            title
        };

        let out = self.terminal.writer();
        writeln!(out, "{}", rule)?;
        writeln!(out, "{}", title)?;
        if !subtitle.is_empty() {
            writeln!(out, "{}", subtitle)?;
        }
        writeln!(out, "{}", rule)?;
        writeln!(out)?;
        Ok(())
    }

    fn render_entries(&mut self) -> Result<()> {
        let out = self.terminal.writer();
        for (idx, action) in self.actions.iter().enumerate() {
            writeln!(out, "{}. {}", idx + 1, action.label)?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Waits for Enter before the menu is shown again.
    fn render_footer(&mut self) -> Result<()> {
        let out = self.terminal.writer();
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(self.config.rule_width))?;
        writeln!(out, "Press Enter to continue...")?;
        out.flush()?;
        self.terminal.read_line()?.ok_or(MenuError::EndOfInput)?;
        Ok(())
    }

    fn notice(&mut self, severity: Severity, err: &MenuError) -> Result<()> {
        let (icon, text) = match severity {
            Severity::Warning => ("⚠️ ", err.to_string()),
            Severity::Error => ("💥", err.to_string()),
        };
        let text = match (self.config.color, severity) {
            (false, _) => text,
            (true, Severity::Warning) => text.yellow().to_string(),
            (true, Severity::Error) => text.red().to_string(),
        };
        writeln!(self.terminal.writer(), "\n{}  {}", icon, text)?;
        Ok(())
    }
}
