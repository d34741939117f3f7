//! Phase orchestration.
//!
//! Runs the check list of a workflow phase strictly in order:
//! - Before host creation: the single driver check selected by the
//!   configured `vm-driver`, or nothing for drivers without one.
//! - After host creation: IP address, ping, HTTP, storage mount, storage
//!   usage, regardless of driver.
//!
//! The first fatal failure stops the phase and is returned as
//! [`PreflightError::CheckFailed`]; no later check in this or any following
//! phase runs. Warnings never stop a phase.

use crate::checks::{network, storage};
use crate::config::{keys, Overrides};
use crate::engine::descriptor::{CheckContext, CheckDescriptor};
use crate::engine::result::PhaseReport;
use crate::engine::runner;
use crate::platform::driver::{Driver, DriverKind};
use crate::platform::host::HostProbe;
use crate::{CheckOutcome, Phase, PreflightError};
use std::io::Write;
use tracing::{debug, info};

/// Runs the preflight phases against explicit configuration.
pub struct PreflightOrchestrator<'a> {
    settings: &'a dyn Overrides,
    host: &'a dyn HostProbe,
}

impl<'a> PreflightOrchestrator<'a> {
    pub fn new(settings: &'a dyn Overrides, host: &'a dyn HostProbe) -> Self {
        PreflightOrchestrator { settings, host }
    }

    /// The configured driver kind; `None` when unset or unknown
    pub fn driver_kind(&self) -> Option<DriverKind> {
        DriverKind::from_name(&self.settings.lookup_string(keys::VM_DRIVER))
    }

    /// Checks that run before the host is created (zero or one)
    pub fn before_host_creation_checks(&self) -> Vec<CheckDescriptor> {
        self.driver_kind()
            .and_then(DriverKind::before_check)
            .into_iter()
            .collect()
    }

    /// Run the checks for the "before host creation" phase
    pub fn before_host_creation(&self, out: &mut dyn Write) -> Result<PhaseReport, PreflightError> {
        let checks = self.before_host_creation_checks();
        if checks.is_empty() {
            debug!(
                driver = %self.settings.lookup_string(keys::VM_DRIVER),
                "No driver check for configured VM driver"
            );
        }
        self.run_phase(Phase::BeforeHostCreation, &checks, None, out)
    }

    /// Run the checks for the "after host creation" phase
    pub fn after_host_creation(
        &self,
        driver: &dyn Driver,
        out: &mut dyn Write,
    ) -> Result<PhaseReport, PreflightError> {
        let checks = after_host_creation_checks();
        self.run_phase(Phase::AfterHostCreation, &checks, Some(driver), out)
    }

    /// Run the requested phases in workflow order, appending each phase's
    /// report to `reports`.
    ///
    /// A phase stopped by a fatal check still contributes its partial report;
    /// later phases do not run.
    pub fn run_workflow(
        &self,
        before: bool,
        driver: Option<&dyn Driver>,
        out: &mut dyn Write,
        reports: &mut Vec<PhaseReport>,
    ) -> Result<(), PreflightError> {
        if before {
            keep_report(reports, self.before_host_creation(out))?;
        }
        if let Some(driver) = driver {
            keep_report(reports, self.after_host_creation(driver, out))?;
        }
        Ok(())
    }

    /// Run `checks` in order, stopping at the first fatal failure
    pub fn run_phase(
        &self,
        phase: Phase,
        checks: &[CheckDescriptor],
        driver: Option<&dyn Driver>,
        out: &mut dyn Write,
    ) -> Result<PhaseReport, PreflightError> {
        info!(%phase, checks = checks.len(), "Running preflight checks");

        let mut report = PhaseReport::new(phase);
        let mut ctx = CheckContext {
            out,
            settings: self.settings,
            host: self.host,
            driver,
        };

        for check in checks {
            let outcome = runner::run(check, &mut ctx)?;
            report.record(check.id, check.message, outcome);

            if outcome == CheckOutcome::FailedFatal {
                info!(%phase, check = check.id, "Preflight stopped by fatal check");
                return Err(PreflightError::CheckFailed {
                    check: check.id.to_string(),
                    hint: check.failure_hint.to_string(),
                    report: Box::new(report),
                });
            }
        }

        let summary = report.summary();
        info!(
            %phase,
            passed = summary.passed,
            warned = summary.warned,
            skipped = summary.skipped,
            "Preflight phase complete"
        );
        Ok(report)
    }
}

fn keep_report(
    reports: &mut Vec<PhaseReport>,
    result: Result<PhaseReport, PreflightError>,
) -> Result<(), PreflightError> {
    match result {
        Ok(report) => {
            reports.push(report);
            Ok(())
        }
        Err(e) => {
            if let Some(report) = e.partial_report() {
                reports.push(report.clone());
            }
            Err(e)
        }
    }
}

/// Checks that run after the host is created, in execution order
pub fn after_host_creation_checks() -> Vec<CheckDescriptor> {
    vec![
        network::instance_ip_check(),
        network::network_ping_check(),
        network::network_http_check(),
        storage::storage_mount_check(),
        storage::storage_usage_check(),
    ]
}

/// Catalogue entry for a registered check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInfo {
    pub id: &'static str,
    pub phase: Phase,
    /// Driver the check applies to; `None` for checks that always run
    pub driver: Option<DriverKind>,
    pub message: &'static str,
    pub skip_key: &'static str,
    pub warn_key: &'static str,
    pub warn_by_default: bool,
}

impl CheckInfo {
    fn from_descriptor(check: &CheckDescriptor, phase: Phase, driver: Option<DriverKind>) -> Self {
        CheckInfo {
            id: check.id,
            phase,
            driver,
            message: check.message,
            skip_key: check.skip_key,
            warn_key: check.warn_key,
            warn_by_default: check.warn_by_default,
        }
    }
}

/// All checks known to the engine, grouped by phase
pub fn list_checks() -> Vec<CheckInfo> {
    let before = DriverKind::ALL.into_iter().filter_map(|kind| {
        kind.before_check()
            .map(|check| CheckInfo::from_descriptor(&check, Phase::BeforeHostCreation, Some(kind)))
    });
    let after = after_host_creation_checks()
        .into_iter()
        .map(|check| CheckInfo::from_descriptor(&check, Phase::AfterHostCreation, None));
    before.chain(after).collect()
}
