//! Output formatters for CLI commands.
//!
//! Every command builds a serializable result and hands it to
//! [`format_output`], so the three formats always carry the same fields.

use anyhow::Result;
use colored::Colorize;
use kpm_core::cli::OutputFormat;
use serde::Serialize;
use serde_json::Value;

/// Formats `data` in the requested output format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use kpm_cli::formatters::format_output;
/// use kpm_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Installed {
///     plugin_name: String,
///     version: String,
/// }
///
/// let data = Installed {
///     plugin_name: "analytics-plugin".to_string(),
///     version: "0.7.1".to_string(),
/// };
///
/// let output = format_output(&data, OutputFormat::Text)?;
/// assert_eq!(output, "plugin_name=analytics-plugin\nversion=0.7.1");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Formats data as indented JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Plain `path=value` lines for shell scripts.
pub mod text {
    use super::{Result, Serialize, Value};

    /// Flattens data into one `path=value` line per scalar.
    ///
    /// Nested keys are joined with `.`, array elements use their index, and
    /// nulls are omitted.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut lines = Vec::new();
        flatten(&value, "", &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, path: &str, lines: &mut Vec<String>) {
        let child = |key: &str| {
            if path.is_empty() {
                key.to_string()
            } else {
                format!("{path}.{key}")
            }
        };

        match value {
            Value::Null => {}
            Value::Bool(b) => lines.push(format!("{path}={b}")),
            Value::Number(n) => lines.push(format!("{path}={n}")),
            Value::String(s) => lines.push(format!("{path}={s}")),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    flatten(item, &child(&index.to_string()), lines);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    flatten(item, &child(key), lines);
                }
            }
        }
    }
}

/// Colorized, indented output for terminals.
pub mod pretty {
    use super::{Colorize, Result, Serialize, Value};
    use std::fmt::Write;

    /// Formats data as an indented key/value tree.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        match &value {
            Value::Object(_) | Value::Array(_) => write_nested(&mut out, &value, 0)?,
            scalar => out.push_str(&scalar_text(scalar)),
        }
        Ok(out.trim_end().to_string())
    }

    fn write_nested(out: &mut String, value: &Value, depth: usize) -> Result<()> {
        let indent = "  ".repeat(depth);
        match value {
            Value::Object(map) => {
                for (key, item) in map {
                    if item.is_null() {
                        continue;
                    }
                    if is_scalar(item) {
                        writeln!(out, "{indent}{}: {}", key.blue().bold(), scalar_text(item))?;
                    } else if is_empty(item) {
                        writeln!(out, "{indent}{}: {}", key.blue().bold(), "(none)".dimmed())?;
                    } else {
                        writeln!(out, "{indent}{}:", key.blue().bold())?;
                        write_nested(out, item, depth + 1)?;
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if is_scalar(item) {
                        writeln!(out, "{indent}- {}", scalar_text(item))?;
                    } else {
                        writeln!(out, "{indent}-")?;
                        write_nested(out, item, depth + 1)?;
                    }
                }
            }
            scalar => writeln!(out, "{indent}{}", scalar_text(scalar))?,
        }
        Ok(())
    }

    const fn is_scalar(value: &Value) -> bool {
        !matches!(value, Value::Object(_) | Value::Array(_))
    }

    fn is_empty(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    fn scalar_text(value: &Value) -> String {
        match value {
            Value::Null => "null".dimmed().to_string(),
            Value::Bool(true) => "yes".green().to_string(),
            Value::Bool(false) => "no".yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Object(_) | Value::Array(_) => value.to_string(),
        }
    }
}
