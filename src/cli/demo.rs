//! Demo actions showing each kind of menu entry.
//!
//! Each action is a plain function over `Arguments` so it can be tested without a terminal.

use anyhow::{bail, Result};
use console_menu::{Action, Arguments, ValueKind};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Countries listed by the table demo.
pub const COUNTRIES: [(&str, &str); 6] = [
    ("NL", "Netherlands"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("GR", "Greece"),
    ("ES", "Spain"),
    ("PK", "Pakistan"),
];

/// Largest multiplication table the demo will build.
const MAX_ROWS: i64 = 100;

#[derive(Debug, Serialize)]
struct Country {
    code: &'static str,
    name: &'static str,
}

/// The actions offered by the demo binary, in menu order.
pub fn demo_actions() -> Vec<Action> {
    vec![
        Action::new("Greet User", greet).prompt("Enter your name"),
        Action::new("Add Two Numbers", add_numbers)
            .typed_prompt("First number", ValueKind::Float)
            .typed_prompt("Second number", ValueKind::Float),
        Action::new("Show Info", show_info),
        Action::new("List Countries", list_countries).table(["code", "name"]),
        Action::new("Multiplication Table", multiplication_table)
            .typed_prompt("Number", ValueKind::Integer)
            .typed_prompt("Rows", ValueKind::Integer)
            .table(["n", "x", "product"]),
        Action::new("Inspect Flags", inspect_flags)
            .kwarg("source", "demo")
            .typed_prompt("Verbose? (y/n)", ValueKind::Boolean)
            .table(["flag", "value"]),
    ]
}

pub fn greet(args: &Arguments) -> Result<Value> {
    let name = args.str(0)?;
    Ok(json!(format!("Hello, {}! Welcome to the TUI.", name)))
}

pub fn add_numbers(args: &Arguments) -> Result<Value> {
    let a = args.f64(0)?;
    let b = args.f64(1)?;
    Ok(json!(format!("Result: {} + {} = {}", a, b, a + b)))
}

pub fn show_info(_args: &Arguments) -> Result<Value> {
    Ok(json!("This is a reusable TUI demo. Have fun!"))
}

pub fn list_countries(_args: &Arguments) -> Result<Value> {
    let countries: Vec<Country> = COUNTRIES
        .iter()
        .map(|&(code, name)| Country { code, name })
        .collect();
    Ok(serde_json::to_value(countries)?)
}

/// Rows of `[n, x, n * x]` for `x` in `1..=rows`.
pub fn multiplication_table(args: &Arguments) -> Result<Value> {
    let n = args.i64(0)?;
    let rows = args.i64(1)?;
    if !(1..=MAX_ROWS).contains(&rows) {
        bail!("rows must be between 1 and {}, got {}", MAX_ROWS, rows);
    }
    debug!(n, rows, "Building multiplication table");

    let table = (1..=rows)
        .map(|x| -> Result<Value> {
            let product = n
                .checked_mul(x)
                .ok_or_else(|| anyhow::anyhow!("{} x {} overflows", n, x))?;
            Ok(json!([n, x, product]))
        })
        .collect::<Result<Vec<Value>>>()?;
    Ok(Value::Array(table))
}

/// Reports the prompted flag together with the pre-bound named values as a mapping.
pub fn inspect_flags(args: &Arguments) -> Result<Value> {
    let mut flags = serde_json::Map::new();
    flags.insert("verbose".to_string(), json!(args.bool(0)?));
    for (key, value) in &args.named {
        flags.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(flags))
}
