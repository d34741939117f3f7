//! Console output for preflight checks.
//!
//! Each check prints `-- <message> ... ` without a newline, then exactly one
//! status token (`SKIP`, `OK` or `FAIL`) and a newline. A `FAIL` token is
//! followed by the failure hint on its own line, indented by three spaces.
//!
//! Predicates may print supplementary text between the message and the
//! token; everything goes to the same writer in program order.

use crate::engine::result::PhaseReport;
use crate::PreflightError;
use std::fmt;
use std::io::{self, Write};

/// Status token printed after a check ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    Skip,
    Ok,
    Fail,
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusToken::Skip => write!(f, "SKIP"),
            StatusToken::Ok => write!(f, "OK"),
            StatusToken::Fail => write!(f, "FAIL"),
        }
    }
}

/// Print the in-progress line of a check.
///
/// Flushes so the message is visible while a slow predicate runs.
pub fn write_check_start(out: &mut dyn Write, message: &str) -> io::Result<()> {
    write!(out, "-- {} ... ", message)?;
    out.flush()
}

/// Terminate the in-progress line with a status token
pub fn write_status(out: &mut dyn Write, token: StatusToken) -> io::Result<()> {
    writeln!(out, "{}", token)?;
    out.flush()
}

/// Print a failure hint on its own indented line
pub fn write_hint(out: &mut dyn Write, hint: &str) -> io::Result<()> {
    writeln!(out, "   {}", hint)?;
    out.flush()
}

/// Render phase reports as pretty-printed JSON
pub fn format_json(reports: &[PhaseReport]) -> Result<String, PreflightError> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// Write phase reports as JSON to `path`
pub fn save_report(reports: &[PhaseReport], path: &std::path::Path) -> Result<(), PreflightError> {
    let json = format_json(reports)?;
    std::fs::write(path, json)
        .map_err(|e| PreflightError::io(format!("writing report {}", path.display()), e))
}
