//! vm-preflight library
//!
//! Preflight checks for hypervisor-backed virtual machine provisioning.
//!
//! Checks run at two points of a provisioning workflow:
//! - Before the host is created: is the hypervisor driver for the configured
//!   VM driver installed and configured?
//! - After the host is up: does the VM have an IPv4 address, can it reach the
//!   outside network, is its persistent storage mounted and not full?
//!
//! Every check may be skipped or downgraded to a warning through
//! configuration overrides. A failed check that is not a warning stops the
//! phase and is reported as [`PreflightError::CheckFailed`].
//!
//! # Example
//!
//! ```no_run
//! use vm_preflight::config::PreflightSettings;
//! use vm_preflight::engine::orchestrator::PreflightOrchestrator;
//! use vm_preflight::platform::host::SystemHost;
//!
//! let settings = PreflightSettings::load(None, &[]).expect("valid configuration");
//! let host = SystemHost;
//! let orchestrator = PreflightOrchestrator::new(&settings, &host);
//! let mut stdout = std::io::stdout();
//! match orchestrator.before_host_creation(&mut stdout) {
//!     Ok(report) => println!("{} checks passed", report.summary().passed),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod platform;
pub mod version;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use config::{Overrides, PreflightSettings};
pub use engine::descriptor::{CheckContext, CheckDescriptor};
pub use engine::orchestrator::PreflightOrchestrator;
pub use engine::result::{PhaseReport, PhaseSummary};
pub use platform::driver::{Driver, DriverError, DriverKind};

/// Terminal outcome of running one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Disabled by its skip override; the predicate never ran
    Skipped,
    /// Predicate held
    Passed,
    /// Predicate failed but the check is advisory
    Warned,
    /// Predicate failed and the check is fatal
    FailedFatal,
}

impl CheckOutcome {
    /// Whether this outcome must stop the workflow
    pub fn is_fatal(self) -> bool {
        matches!(self, CheckOutcome::FailedFatal)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Skipped => write!(f, "skipped"),
            CheckOutcome::Passed => write!(f, "passed"),
            CheckOutcome::Warned => write!(f, "warned"),
            CheckOutcome::FailedFatal => write!(f, "failed"),
        }
    }
}

/// Workflow phase a check list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the VM host is created
    BeforeHostCreation,
    /// After the VM host is up and reachable over SSH
    AfterHostCreation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::BeforeHostCreation => write!(f, "before host creation"),
            Phase::AfterHostCreation => write!(f, "after host creation"),
        }
    }
}

/// Error types for vm-preflight operations.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// A fatal check failed. Displays as the indented failure hint, which is
    /// the final message of the run. `report` holds the phase up to and
    /// including the failed check.
    #[error("   {hint}")]
    CheckFailed {
        check: String,
        hint: String,
        report: Box<PhaseReport>,
    },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An override value could not be interpreted
    #[error("invalid value '{value}' for override '{key}'")]
    InvalidOverride { key: String, value: String },

    /// I/O error
    #[error("I/O error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization error
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl PreflightError {
    /// Wrap an I/O error with the operation it came from
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PreflightError::Io {
            context: context.into(),
            source,
        }
    }

    /// The partial phase report carried by a fatal check failure
    pub fn partial_report(&self) -> Option<&PhaseReport> {
        match self {
            PreflightError::CheckFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}
