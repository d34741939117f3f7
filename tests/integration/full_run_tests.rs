//! Full run integration tests.
//!
//! Runs both phases end to end against mock drivers and hosts and checks the
//! console output, the outcomes and where a fatal failure stops the run.

use crate::mocks::{MockDriver, MockHost, MockOverrides, MockVmConfig};
use std::cell::Cell;
use std::rc::Rc;
use vm_preflight::config::{keys, PreflightSettings};
use vm_preflight::engine::orchestrator::PreflightOrchestrator;
use vm_preflight::engine::result::PhaseReport;
use vm_preflight::{CheckDescriptor, CheckOutcome, Phase, PreflightError};

const KVM_PATH: &str = "/usr/local/bin/docker-machine-driver-kvm";
const XHYVE_PATH: &str = "/usr/local/bin/docker-machine-driver-xhyve";

fn settings_for_driver(driver: &str) -> PreflightSettings {
    let mut settings = PreflightSettings::new();
    settings.set_string(keys::VM_DRIVER, driver);
    settings
}

fn run_before(settings: &PreflightSettings, host: &MockHost) -> (Result<PhaseReport, PreflightError>, String) {
    let orchestrator = PreflightOrchestrator::new(settings, host);
    let mut out = Vec::new();
    let result = orchestrator.before_host_creation(&mut out);
    (result, String::from_utf8(out).unwrap())
}

fn run_after(
    settings: &PreflightSettings,
    vm: MockVmConfig,
) -> (Result<PhaseReport, PreflightError>, String, MockDriver) {
    let host = MockHost::bare();
    let driver = MockDriver::new(vm);
    let orchestrator = PreflightOrchestrator::new(settings, &host);
    let mut out = Vec::new();
    let result = orchestrator.after_host_creation(&driver, &mut out);
    (result, String::from_utf8(out).unwrap(), driver)
}

// Before host creation

#[test]
fn test_before_unknown_driver_is_silent_noop() {
    for driver in ["virtualbox", "vmwarefusion", "none", "", "KVM"] {
        let (result, out) = run_before(&settings_for_driver(driver), &MockHost::bare());
        let report = result.unwrap();
        assert!(report.is_empty(), "driver {:?} ran checks", driver);
        assert!(out.is_empty(), "driver {:?} produced output", driver);
    }
}

#[test]
fn test_before_kvm_installed() {
    let host = MockHost::bare().with_executable("docker-machine-driver-kvm", KVM_PATH);
    let (result, out) = run_before(&settings_for_driver("kvm"), &host);

    let report = result.unwrap();
    assert_eq!(report.check_ids(), vec!["kvm-driver"]);
    assert_eq!(report.outcome_of("kvm-driver"), Some(CheckOutcome::Passed));
    assert_eq!(
        out,
        format!(
            "-- Checking if KVM driver is installed ... \n   Driver is available at {} ... OK\n",
            KVM_PATH
        )
    );
}

#[test]
fn test_before_kvm_missing_is_fatal() {
    let (result, out) = run_before(&settings_for_driver("kvm"), &MockHost::bare());

    let err = result.unwrap_err();
    assert!(matches!(err, PreflightError::CheckFailed { ref check, .. } if check == "kvm-driver"));
    assert_eq!(
        out,
        "-- Checking if KVM driver is installed ... FAIL\n   See the 'Setting Up the Driver Plug-in' topic for more information\n"
    );
    assert!(err.to_string().contains("Setting Up the Driver Plug-in"));
}

#[test]
fn test_before_kvm_missing_downgraded_by_warn_override() {
    let mut settings = settings_for_driver("kvm");
    settings.set_bool(keys::WARN_CHECK_KVM_DRIVER, true);

    let (result, out) = run_before(&settings, &MockHost::bare());
    assert_eq!(result.unwrap().outcome_of("kvm-driver"), Some(CheckOutcome::Warned));
    assert!(out.contains("FAIL\n   See the 'Setting Up the Driver Plug-in'"));
}

#[test]
fn test_before_xhyve_without_setuid_fails() {
    let host = MockHost::bare().with_executable("docker-machine-driver-xhyve", XHYVE_PATH);
    let (result, out) = run_before(&settings_for_driver("xhyve"), &host);

    assert!(result.is_err());
    assert_eq!(
        out,
        format!(
            "-- Checking if xhyve driver is installed ... \n   Driver is available at {}\n   Checking for setuid bit ... FAIL\n   See the 'Setting Up the Driver Plug-in' topic for more information\n",
            XHYVE_PATH
        )
    );
}

#[test]
fn test_before_xhyve_with_setuid_passes() {
    let host = MockHost::bare()
        .with_executable("docker-machine-driver-xhyve", XHYVE_PATH)
        .with_setuid(XHYVE_PATH);
    let (result, out) = run_before(&settings_for_driver("xhyve"), &host);

    assert_eq!(result.unwrap().summary().passed, 1);
    assert!(out.ends_with("Checking for setuid bit ... OK\n"));
}

#[test]
fn test_before_hyperv_switch_env() {
    let (result, out) = run_before(&settings_for_driver("hyperv"), &MockHost::bare());
    assert!(result.is_err());
    assert_eq!(
        out,
        "-- Checking if Hyper-V driver is configured ... FAIL\n   Hyper-V virtual switch is not set\n"
    );

    let host = MockHost::bare().with_env("HYPERV_VIRTUAL_SWITCH", "External Switch");
    let (result, out) = run_before(&settings_for_driver("hyperv"), &host);
    assert!(result.is_ok());
    assert_eq!(out, "-- Checking if Hyper-V driver is configured ... OK\n");
}

#[test]
fn test_before_skip_override() {
    let mut settings = settings_for_driver("hyperv");
    settings.set_bool(keys::SKIP_CHECK_HYPERV_DRIVER, true);

    let (result, out) = run_before(&settings, &MockHost::bare());
    assert_eq!(result.unwrap().outcome_of("hyperv-driver"), Some(CheckOutcome::Skipped));
    assert_eq!(out, "-- Checking if Hyper-V driver is configured ... SKIP\n");
}

// After host creation

#[test]
fn test_after_healthy_vm_all_ok() {
    let (result, out, driver) = run_after(&PreflightSettings::new(), MockVmConfig::healthy());

    let report = result.unwrap();
    assert_eq!(report.phase, Phase::AfterHostCreation);
    assert_eq!(
        report.check_ids(),
        vec!["instance-ip", "network-ping", "network-http", "storage-mount", "storage-usage"]
    );
    assert_eq!(report.summary().passed, 5);

    let expected = "\
-- Checking for IP address ... OK
-- Checking if external host is reachable from the VM ... 
   Pinging 8.8.8.8 ... OK
-- Checking HTTP connectivity from the VM ... 
   Retrieving http://minishift.io/index.html ... OK
-- Checking if persistent storage volume is mounted ... OK
-- Checking available disk space ... 12% OK
";
    assert_eq!(out, expected);
    assert_eq!(driver.commands().len(), 4);
}

#[test]
fn test_after_ipv6_only_stops_everything() {
    let (result, out, driver) = run_after(&PreflightSettings::new(), MockVmConfig::ipv6_only());

    assert!(matches!(result, Err(PreflightError::CheckFailed { ref check, .. }) if check == "instance-ip"));
    assert_eq!(out, "-- Checking for IP address ... FAIL\n   Error determining IP address\n");
    assert!(driver.commands().is_empty());
}

#[test]
fn test_after_offline_vm_only_warns() {
    let (result, out, _) = run_after(&PreflightSettings::new(), MockVmConfig::offline());

    let report = result.unwrap();
    assert_eq!(report.outcome_of("network-ping"), Some(CheckOutcome::Warned));
    assert_eq!(report.outcome_of("network-http"), Some(CheckOutcome::Warned));
    assert_eq!(report.outcome_of("storage-usage"), Some(CheckOutcome::Passed));
    assert!(out.contains("Pinging 8.8.8.8 ... FAIL\n   VM is unable to ping external host\n"));
    assert!(out.contains("FAIL\n   VM cannot connect to external URL with HTTP\n"));
}

#[test]
fn test_after_unmounted_storage_prevents_usage_check() {
    let (result, out, driver) = run_after(&PreflightSettings::new(), MockVmConfig::unmounted());

    assert!(matches!(result, Err(PreflightError::CheckFailed { ref check, .. }) if check == "storage-mount"));
    assert!(out.ends_with(
        "-- Checking if persistent storage volume is mounted ... FAIL\n   Persistent volume storage is not mounted\n"
    ));
    assert!(!out.contains("Checking available disk space"));
    assert!(!driver.commands().iter().any(|c| c.starts_with("df ")));
}

#[test]
fn test_after_unmounted_storage_with_warning_continues() {
    let mut settings = PreflightSettings::new();
    settings.set_bool(keys::WARN_CHECK_STORAGE_MOUNT, true);

    let (result, out, _) = run_after(&settings, MockVmConfig::unmounted());
    let report = result.unwrap();
    assert_eq!(report.outcome_of("storage-mount"), Some(CheckOutcome::Warned));
    assert_eq!(report.outcome_of("storage-usage"), Some(CheckOutcome::Passed));
    assert!(out.contains("-- Checking available disk space ... 12% OK\n"));
}

#[test]
fn test_after_disk_filling_marks_but_passes() {
    let (result, out, _) = run_after(&PreflightSettings::new(), MockVmConfig::disk_filling());
    assert!(result.is_ok());
    assert!(out.ends_with("-- Checking available disk space ... 85% !!! OK\n"));
}

#[test]
fn test_after_disk_full_is_fatal() {
    let (result, out, _) = run_after(&PreflightSettings::new(), MockVmConfig::disk_full());
    assert!(matches!(result, Err(PreflightError::CheckFailed { ref check, .. }) if check == "storage-usage"));
    assert!(out.ends_with(
        "-- Checking available disk space ... 99% FAIL\n   Insufficient disk space on the persistent storage volume\n"
    ));
}

#[test]
fn test_after_skipped_checks_never_touch_the_vm() {
    let mut settings = PreflightSettings::new();
    for key in [
        keys::SKIP_CHECK_INSTANCE_IP,
        keys::SKIP_CHECK_NETWORK_PING,
        keys::SKIP_CHECK_NETWORK_HTTP,
        keys::SKIP_CHECK_STORAGE_MOUNT,
        keys::SKIP_CHECK_STORAGE_USAGE,
    ] {
        settings.set_bool(key, true);
    }

    let (result, out, driver) = run_after(&settings, MockVmConfig::offline());
    assert_eq!(result.unwrap().summary().skipped, 5);
    assert!(driver.commands().is_empty());
    assert_eq!(out.matches(" ... SKIP\n").count(), 5);
    assert!(!out.contains("Pinging"));
}

#[test]
fn test_after_uses_configured_targets() {
    let mut settings = PreflightSettings::new();
    settings.set_string(keys::NETWORK_PING_HOST, "1.1.1.1");
    settings.set_string(keys::NETWORK_HTTP_HOST, "http://proxy.test/health");

    let (_, out, driver) = run_after(&settings, MockVmConfig::healthy());
    assert!(out.contains("Pinging 1.1.1.1 ... OK"));
    assert!(out.contains("Retrieving http://proxy.test/health ... OK"));
    let commands = driver.commands();
    assert_eq!(commands[0], "ping -c1 -w1 1.1.1.1");
    assert_eq!(commands[1], "curl -sSf -o /dev/null http://proxy.test/health");
}

// Both phases

#[test]
fn test_fatal_before_phase_prevents_after_phase() {
    let settings = settings_for_driver("kvm");
    let host = MockHost::bare();
    let driver = MockDriver::new(MockVmConfig::healthy());
    let orchestrator = PreflightOrchestrator::new(&settings, &host);
    let mut out = Vec::new();

    let outcome = orchestrator
        .before_host_creation(&mut out)
        .and_then(|_| orchestrator.after_host_creation(&driver, &mut out));

    assert!(matches!(outcome, Err(PreflightError::CheckFailed { ref check, .. }) if check == "kvm-driver"));
    assert!(driver.commands().is_empty());
}

// Policy properties over arbitrary descriptors

fn counted(result: bool, calls: Rc<Cell<u32>>, warn_by_default: bool) -> CheckDescriptor {
    CheckDescriptor::new("counted", "Checking counted", move |_| {
        calls.set(calls.get() + 1);
        result
    })
    .skip_key("skip-check-counted")
    .warn_key("warn-check-counted")
    .warn_by_default(warn_by_default)
    .failure_hint("counted failed")
}

#[test]
fn test_policy_matrix() {
    let host = MockHost::bare();
    for skip in [false, true] {
        for warn in [false, true] {
            for default_warn in [false, true] {
                for holds in [false, true] {
                    let settings = MockOverrides::new()
                        .with_bool("skip-check-counted", skip)
                        .with_bool("warn-check-counted", warn);
                    let calls = Rc::new(Cell::new(0));
                    let checks = vec![counted(holds, calls.clone(), default_warn)];
                    let orchestrator = PreflightOrchestrator::new(&settings, &host);
                    let mut out = Vec::new();

                    let result =
                        orchestrator.run_phase(Phase::AfterHostCreation, &checks, None, &mut out);
                    let out = String::from_utf8(out).unwrap();

                    if skip {
                        assert_eq!(calls.get(), 0);
                        assert_eq!(out, "-- Checking counted ... SKIP\n");
                        assert!(result.is_ok());
                    } else if holds {
                        assert_eq!(calls.get(), 1);
                        assert_eq!(out, "-- Checking counted ... OK\n");
                        assert!(result.is_ok());
                    } else {
                        assert_eq!(calls.get(), 1);
                        assert_eq!(out, "-- Checking counted ... FAIL\n   counted failed\n");
                        assert_eq!(result.is_ok(), warn || default_warn);
                    }
                }
            }
        }
    }
}

#[test]
fn test_after_phase_with_plain_override_map() {
    let settings = MockOverrides::new()
        .with_string(keys::NETWORK_PING_HOST, "9.9.9.9")
        .with_bool(keys::SKIP_CHECK_STORAGE_USAGE, true);
    let host = MockHost::bare();
    let driver = MockDriver::new(MockVmConfig::disk_full());
    let mut out = Vec::new();

    let report = PreflightOrchestrator::new(&settings, &host)
        .after_host_creation(&driver, &mut out)
        .unwrap();

    assert_eq!(report.outcome_of("storage-usage"), Some(CheckOutcome::Skipped));
    assert_eq!(driver.commands()[0], "ping -c1 -w1 9.9.9.9");
}
