//! Hypervisor driver checks, run before the VM host is created.
//!
//! Exactly one of these applies to a given configured driver; drivers
//! without a helper binary (VirtualBox, VMware Fusion) have no check.

use crate::config::keys;
use crate::engine::descriptor::{CheckContext, CheckDescriptor};
use crate::platform::driver::DriverKind;
use std::io::Write;

pub const XHYVE_DRIVER_BINARY: &str = "docker-machine-driver-xhyve";
pub const KVM_DRIVER_BINARY: &str = "docker-machine-driver-kvm";
/// Names the Hyper-V virtual switch the VM attaches to
pub const HYPERV_SWITCH_ENV: &str = "HYPERV_VIRTUAL_SWITCH";

const PLUGIN_HINT: &str = "See the 'Setting Up the Driver Plug-in' topic for more information";

impl DriverKind {
    /// The driver check for this kind, if it has one
    pub fn before_check(self) -> Option<CheckDescriptor> {
        match self {
            DriverKind::Xhyve => Some(xhyve_driver_check()),
            DriverKind::Kvm => Some(kvm_driver_check()),
            DriverKind::HyperV => Some(hyperv_driver_check()),
            DriverKind::VirtualBox | DriverKind::VmwareFusion => None,
        }
    }
}

pub fn xhyve_driver_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "xhyve-driver",
        "Checking if xhyve driver is installed",
        check_xhyve_driver,
    )
    .skip_key(keys::SKIP_CHECK_XHYVE_DRIVER)
    .warn_key(keys::WARN_CHECK_XHYVE_DRIVER)
    .failure_hint(PLUGIN_HINT)
}

pub fn kvm_driver_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "kvm-driver",
        "Checking if KVM driver is installed",
        check_kvm_driver,
    )
    .skip_key(keys::SKIP_CHECK_KVM_DRIVER)
    .warn_key(keys::WARN_CHECK_KVM_DRIVER)
    .failure_hint(PLUGIN_HINT)
}

pub fn hyperv_driver_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "hyperv-driver",
        "Checking if Hyper-V driver is configured",
        check_hyperv_driver,
    )
    .skip_key(keys::SKIP_CHECK_HYPERV_DRIVER)
    .warn_key(keys::WARN_CHECK_HYPERV_DRIVER)
    .failure_hint("Hyper-V virtual switch is not set")
}

/// The xhyve driver must be on the search path and setuid root.
pub fn check_xhyve_driver(ctx: &mut CheckContext<'_>) -> bool {
    let Some(found) = ctx.host.find_executable(XHYVE_DRIVER_BINARY) else {
        return false;
    };
    let path = ctx.host.resolve_link(&found);

    let _ = write!(ctx.out, "\n   Driver is available at {}\n", path.display());
    let _ = write!(ctx.out, "   Checking for setuid bit ... ");

    ctx.host.has_setuid(&path)
}

pub fn check_kvm_driver(ctx: &mut CheckContext<'_>) -> bool {
    let Some(path) = ctx.host.find_executable(KVM_DRIVER_BINARY) else {
        return false;
    };
    let _ = write!(ctx.out, "\n   Driver is available at {} ... ", path.display());
    true
}

pub fn check_hyperv_driver(ctx: &mut CheckContext<'_>) -> bool {
    ctx.host
        .env_var(HYPERV_SWITCH_ENV)
        .map(|switch| !switch.is_empty())
        .unwrap_or(false)
}
