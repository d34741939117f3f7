//! Persistent storage checks, run after the VM host is up.

use crate::checks::with_driver;
use crate::config::keys;
use crate::engine::descriptor::{CheckContext, CheckDescriptor};
use crate::platform::driver::{Driver, DriverError};
use std::io::Write;
use tracing::debug;

/// Mount point of the VM's persistent volume
pub const STORAGE_DISK: &str = "/mnt/sda1";

/// Usage above this percentage prints a warning marker
pub const USAGE_WARN_PERCENT: u8 = 80;
/// Usage at or above this percentage fails the check
pub const USAGE_FAIL_PERCENT: u8 = 98;

pub fn storage_mount_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "storage-mount",
        "Checking if persistent storage volume is mounted",
        check_storage_mounted,
    )
    .skip_key(keys::SKIP_CHECK_STORAGE_MOUNT)
    .warn_key(keys::WARN_CHECK_STORAGE_MOUNT)
    .failure_hint("Persistent volume storage is not mounted")
}

pub fn storage_usage_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "storage-usage",
        "Checking available disk space",
        check_storage_usage,
    )
    .skip_key(keys::SKIP_CHECK_STORAGE_USAGE)
    .warn_key(keys::WARN_CHECK_STORAGE_USAGE)
    .failure_hint("Insufficient disk space on the persistent storage volume")
}

pub fn check_storage_mounted(ctx: &mut CheckContext<'_>) -> bool {
    with_driver(ctx, |driver, _out| match is_mounted(driver, STORAGE_DISK) {
        Ok(mounted) => mounted,
        Err(e) => {
            debug!(mountpoint = STORAGE_DISK, error = %e, "Could not read mount table");
            false
        }
    })
}

/// Prints the used percentage; `!!! ` marks usage above the warning level.
pub fn check_storage_usage(ctx: &mut CheckContext<'_>) -> bool {
    with_driver(ctx, |driver, out| {
        let used = disk_usage(driver, STORAGE_DISK);
        let _ = write!(out, "{} ", used);

        let Some(usage) = parse_usage_percent(&used) else {
            return false;
        };
        if usage > USAGE_WARN_PERCENT && usage < USAGE_FAIL_PERCENT {
            let _ = write!(out, "!!! ");
        }
        usage < USAGE_FAIL_PERCENT
    })
}

/// Whether `mountpoint` appears in the VM's live mount table
pub fn is_mounted(driver: &dyn Driver, mountpoint: &str) -> Result<bool, DriverError> {
    let mounts = driver.run_remote_command("cat /proc/mounts")?;
    Ok(mount_table_contains(&mounts, mountpoint))
}

/// Whether any entry of a mount table mentions `mountpoint` as a whole field
pub fn mount_table_contains(mounts: &str, mountpoint: &str) -> bool {
    mounts
        .lines()
        .any(|line| line.split_whitespace().any(|field| field == mountpoint))
}

/// Used-space figure (e.g. `45%`) for `mountpoint`, or `ERR` when it cannot be read
pub fn disk_usage(driver: &dyn Driver, mountpoint: &str) -> String {
    let command = format!("df -h {} | awk 'FNR > 1 {{print $5}}'", mountpoint);
    match driver.run_remote_command(&command) {
        Ok(out) => out.trim_matches('\n').to_string(),
        Err(e) => {
            debug!(mountpoint, error = %e, "Could not read disk usage");
            "ERR".to_string()
        }
    }
}

/// Parse `"85%"` into 85. Values outside 0-100 are rejected.
pub fn parse_usage_percent(used: &str) -> Option<u8> {
    let value: u8 = used.trim().trim_end_matches('%').parse().ok()?;
    (value <= 100).then_some(value)
}
