//! Defines the data structures describing menu entries.
//!
//! Includes:
//! - `Action`: one selectable entry bundling a callable with its arguments.
//! - `PromptSpec` and `ValueKind`: runtime prompts and their conversion table.
//! - `DisplayMode`: how an action's return value is shown.
//! - `Arguments`: the positional and named values handed to a callable.

use crate::error::{MenuError, Result};
use anyhow::{anyhow, Context};
use serde_json::{Map, Value};
use std::fmt;

/// Signature of every user-supplied action.
pub type ActionFn = dyn Fn(&Arguments) -> anyhow::Result<Value>;

/// The finite set of types a prompt answer can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Raw text, passed through unchanged.
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl ValueKind {
    /// Human-readable name used in conversion error notices.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
        }
    }

    /// Converts raw prompt text into a typed value.
    ///
    /// Numeric and boolean kinds ignore surrounding whitespace; text is kept verbatim.
    pub fn convert(self, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        let converted = match self {
            ValueKind::Text => Some(Value::String(raw.to_string())),
            ValueKind::Integer => trimmed.parse::<i64>().ok().map(Value::from),
            ValueKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64) // NaN and infinities are rejected here
                .map(Value::Number),
            ValueKind::Boolean => parse_bool(trimmed).map(Value::Bool),
        };

        converted.ok_or_else(|| MenuError::PromptConversion {
            input: raw.to_string(),
            expected: self.name(),
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// A single runtime request for one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub text: String,
    pub kind: ValueKind,
}

impl PromptSpec {
    pub fn new(text: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// How the return value of an action is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Print the value's textual form.
    #[default]
    Scalar,
    /// Render the value as a table with these column labels.
    Table(Vec<String>),
}

/// Positional and named values passed to an action.
///
/// Positional values are the action's static arguments followed by the
/// converted prompt answers, in prompt order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl Arguments {
    pub fn new(positional: Vec<Value>, named: Map<String, Value>) -> Self {
        Self { positional, named }
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Returns the positional value at `index`, failing when the action was
    /// configured with too few arguments.
    pub fn get(&self, index: usize) -> anyhow::Result<&Value> {
        self.positional.get(index).ok_or_else(|| {
            anyhow!(
                "missing positional argument {} (got {})",
                index + 1,
                self.positional.len()
            )
        })
    }

    pub fn str(&self, index: usize) -> anyhow::Result<&str> {
        self.get(index)?
            .as_str()
            .with_context(|| format!("argument {} is not a string", index + 1))
    }

    pub fn i64(&self, index: usize) -> anyhow::Result<i64> {
        self.get(index)?
            .as_i64()
            .with_context(|| format!("argument {} is not an integer", index + 1))
    }

    /// Integers are accepted as floats.
    pub fn f64(&self, index: usize) -> anyhow::Result<f64> {
        self.get(index)?
            .as_f64()
            .with_context(|| format!("argument {} is not a number", index + 1))
    }

    pub fn bool(&self, index: usize) -> anyhow::Result<bool> {
        self.get(index)?
            .as_bool()
            .with_context(|| format!("argument {} is not a boolean", index + 1))
    }

    /// Returns a named value, if present.
    pub fn named(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// Fails unless exactly `expected` positional values were supplied.
    pub fn expect_len(&self, expected: usize) -> anyhow::Result<()> {
        if self.positional.len() != expected {
            return Err(anyhow!(
                "takes {} positional argument(s) but {} were given",
                expected,
                self.positional.len()
            ));
        }
        Ok(())
    }
}

/// The callable behind a menu entry.
pub(crate) enum Handler {
    /// The synthetic entry that stops the engine.
    Exit,
    User(Box<ActionFn>),
}

/// One selectable menu entry.
///
/// Built with [`Action::new`] and the builder methods; validated once when the
/// owning engine is constructed and never mutated afterwards.
pub struct Action {
    pub(crate) label: String,
    pub(crate) handler: Handler,
    pub(crate) static_args: Vec<Value>,
    pub(crate) static_kwargs: Map<String, Value>,
    pub(crate) prompts: Vec<PromptSpec>,
    pub(crate) display: DisplayMode,
}

impl Action {
    /// Creates an action with no arguments, no prompts and scalar display.
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + 'static,
    {
        Self::with_handler(label, Handler::User(Box::new(action)))
    }

    pub(crate) fn exit() -> Self {
        Self::with_handler("Exit", Handler::Exit)
    }

    fn with_handler(label: impl Into<String>, handler: Handler) -> Self {
        Self {
            label: label.into(),
            handler,
            static_args: Vec::new(),
            static_kwargs: Map::new(),
            prompts: Vec::new(),
            display: DisplayMode::Scalar,
        }
    }

    /// Appends one pre-bound positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.static_args.push(value.into());
        self
    }

    /// Appends several pre-bound positional arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.static_args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Adds a pre-bound named argument.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.static_kwargs.insert(key.into(), value.into());
        self
    }

    /// Adds a prompt whose answer is passed through as text.
    pub fn prompt(self, text: impl Into<String>) -> Self {
        self.typed_prompt(text, ValueKind::Text)
    }

    /// Adds a prompt whose answer is converted to `kind`.
    pub fn typed_prompt(mut self, text: impl Into<String>, kind: ValueKind) -> Self {
        self.prompts.push(PromptSpec::new(text, kind));
        self
    }

    /// Switches to table display with the given column labels.
    pub fn table<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display = DisplayMode::Table(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn prompts(&self) -> &[PromptSpec] {
        &self.prompts
    }

    pub fn display(&self) -> &DisplayMode {
        &self.display
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.handler, Handler::Exit)
    }

    /// Checks the invariants that cannot be expressed in the builder types.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(MenuError::InvalidAction(
                "action label must not be empty".to_string(),
            ));
        }
        if let DisplayMode::Table(columns) = &self.display {
            if columns.is_empty() {
                return Err(MenuError::InvalidAction(format!(
                    "'{}' uses table display but has no column labels",
                    self.label
                )));
            }
        }
        Ok(())
    }

    /// Builds the argument list: static arguments followed by prompt answers.
    pub fn arguments(&self, prompted: Vec<Value>) -> Arguments {
        let mut positional = self.static_args.clone();
        positional.extend(prompted);
        Arguments::new(positional, self.static_kwargs.clone())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("exit", &self.is_exit())
            .field("static_args", &self.static_args)
            .field("static_kwargs", &self.static_kwargs)
            .field("prompts", &self.prompts)
            .field("display", &self.display)
            .finish()
    }
}
