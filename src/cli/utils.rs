use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::routes;
use crate::session::Navigator;
use crate::view::{DisplayRow, PageWindow, ViewRenderer};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output any serializable value; text mode prints `key: value` lines for objects
pub fn output_value<T: Serialize>(output_format: &OutputFormat, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Text => match &value {
            Value::Object(map) => {
                for (key, field) in map {
                    match field {
                        Value::String(s) => println!("{}: {}", key, s),
                        other => println!("{}: {}", key, other),
                    }
                }
            }
            other => println!("{}", other),
        },
    }
    Ok(())
}

/// Left-aligned text table sized to its widest cell per column
pub fn print_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.as_ref().chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.to_vec()));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        println!("{}", line(row.iter().map(AsRef::as_ref).collect()));
    }
}

/// Renders one page of a data view to the terminal.
///
/// Failures are held until `finish` so the caller reports them once.
pub struct PageRenderer<'a> {
    output_format: &'a OutputFormat,
    collection: &'a str,
    window: PageWindow,
    outcome: anyhow::Result<()>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(output_format: &'a OutputFormat, collection: &'a str, window: PageWindow) -> Self {
        Self {
            output_format,
            collection,
            window,
            outcome: Ok(()),
        }
    }

    pub fn finish(self) -> anyhow::Result<()> {
        self.outcome
    }

    fn print_page<T: DisplayRow + Serialize>(&self, records: &[T]) -> anyhow::Result<()> {
        let mut window = self.window;
        window.clamp(records.len());
        let page = window.slice(records);

        match self.output_format {
            OutputFormat::Json => {
                let body = json!({
                    self.collection: page,
                    "page": window.current_page(),
                    "total_pages": window.total_pages(records.len()),
                    "total": records.len(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            OutputFormat::Text => {
                let rows: Vec<Vec<String>> = page.iter().map(DisplayRow::display_row).collect();
                print_table(T::headers(), &rows);
                println!(
                    "\nPage {} of {} ({} rows)",
                    window.current_page(),
                    window.total_pages(records.len()),
                    records.len()
                );
            }
        }
        Ok(())
    }
}

impl<'a, T> ViewRenderer<T> for PageRenderer<'a>
where
    T: DisplayRow + Serialize,
{
    fn loading(&mut self) {
        if let OutputFormat::Text = self.output_format {
            println!("Loading...");
        }
    }

    fn error(&mut self, message: &str) {
        self.outcome = Err(anyhow::anyhow!(message.to_string()));
    }

    fn empty(&mut self) {
        self.outcome = output_empty_collection(self.output_format, self.collection, "No data available");
    }

    fn ready(&mut self, records: &[T]) {
        self.outcome = self.print_page(records);
    }
}

/// Wrap a gateway failure so the user sees its message while the
/// `ClientError` stays reachable through `downcast_ref`
pub fn api_error(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Prints the login hint when the session is evicted
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Log in again with: trendwatch auth login <username> ({})", routes::LOGIN);
    }
}

/// Read a password from stdin when none was given on the command line.
///
/// Input is not masked; the terminal echoes it.
pub fn prompt_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
