//! Command execution.

use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use anyhow::Context;
use tracing::{debug, error};

use crate::cli::args::AnalyzeArgs;
use pyshape_rs::core::classifier::{RENDERED_KINDS, SKIPPED_KINDS};
use pyshape_rs::{ParseRequest, PyshapeConfig, PyshapeError, ShapeEngine, ShapeReport};

/// Answer one request read from standard input.
pub fn exchange_command(config: PyshapeConfig) -> anyhow::Result<()> {
    let line = read_request_line(io::stdin().lock())?;
    let request = ParseRequest::from_json_line(&line)?;

    let mut engine = ShapeEngine::new(config)?;
    let report = guarded(|| engine.analyze_request(&request))?;
    write_report(&report, engine.config().pretty)
}

/// Analyze a source file with the same engine as the exchange.
pub fn analyze_command(args: AnalyzeArgs, config: PyshapeConfig) -> anyhow::Result<()> {
    let code = std::fs::read_to_string(&args.file).map_err(|e| {
        PyshapeError::io(format!("Failed to read source file: {}", args.file.display()), e)
    })?;
    let mut engine = ShapeEngine::new(config)?;
    let mode = args.mode.unwrap_or(engine.config().default_mode);
    debug!(file = %args.file.display(), %mode, "analyzing file");

    let report = guarded(|| engine.analyze_source(&code, mode))?;
    write_report(&report, engine.config().pretty)
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("# Default pyshape configuration");
    println!("# Save this to a file and pass it with --config (or PYSHAPE_CONFIG)");
    println!();
    print!("{}", PyshapeConfig::default().to_yaml()?);
    Ok(())
}

/// Print the static classification tables.
pub fn list_kinds() -> anyhow::Result<()> {
    println!("Skipped kinds:");
    for kind in SKIPPED_KINDS {
        println!("  {kind}");
    }
    println!();
    println!("Value-rendered kinds:");
    for (kind, _) in RENDERED_KINDS {
        println!("  {kind}");
    }
    Ok(())
}

/// Print a failure the way consumers of the exchange expect it.
pub fn report_failure(err: &anyhow::Error) {
    eprintln!("Parsing failed!\n\nError occurred: {err}");
}

fn read_request_line(mut input: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| PyshapeError::io("Failed to read request from stdin", e))?;
    if read == 0 {
        return Err(PyshapeError::invalid_request("no request on standard input").into());
    }
    Ok(line)
}

fn write_report(report: &ShapeReport, pretty: bool) -> anyhow::Result<()> {
    let json = report.to_json(pretty)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write response")?;
    stdout.flush().context("Failed to write response")?;
    Ok(())
}

/// Run the engine, turning a panic during traversal into an internal error.
fn guarded<F>(run: F) -> pyshape_rs::Result<ShapeReport>
where
    F: FnOnce() -> pyshape_rs::Result<ShapeReport>,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| error!("{info}")));
    let outcome = panic::catch_unwind(AssertUnwindSafe(run));
    panic::set_hook(previous);

    outcome.unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unexpected fault while walking the tree".to_string());
        Err(PyshapeError::internal(message))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_request_line_takes_first_line_only() {
        let input = "{\"code\": \"x\"}\n{\"code\": \"y\"}\n".as_bytes();
        assert_eq!(read_request_line(input).unwrap(), "{\"code\": \"x\"}\n");
    }

    #[test]
    fn test_read_request_line_rejects_empty_input() {
        assert!(read_request_line("".as_bytes()).is_err());
    }

    #[test]
    fn test_guarded_converts_panics() {
        let result = guarded(|| panic!("boom"));
        match result {
            Err(PyshapeError::Internal { message, .. }) => assert_eq!(message, "boom"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_guarded_passes_results_through() {
        let result = guarded(|| Err(PyshapeError::unknown_mode("tree")));
        assert!(matches!(result, Err(PyshapeError::UnknownMode { .. })));
    }
}
