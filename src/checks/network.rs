//! Network checks, run after the VM host is up.

use crate::checks::with_driver;
use crate::config::keys;
use crate::engine::descriptor::{CheckContext, CheckDescriptor};
use crate::platform::driver::Driver;
use std::io::Write;
use std::net::IpAddr;
use tracing::debug;

/// Pinged from inside the VM when `network-ping-host` is not set
pub const DEFAULT_PING_HOST: &str = "8.8.8.8";
/// Retrieved from inside the VM when `network-http-host` is not set
pub const DEFAULT_HTTP_URL: &str = "http://minishift.io/index.html";

pub fn instance_ip_check() -> CheckDescriptor {
    CheckDescriptor::new("instance-ip", "Checking for IP address", check_instance_ip)
        .skip_key(keys::SKIP_CHECK_INSTANCE_IP)
        .warn_key(keys::WARN_CHECK_INSTANCE_IP)
        .failure_hint("Error determining IP address")
}

pub fn network_ping_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "network-ping",
        "Checking if external host is reachable from the VM",
        check_ip_connectivity,
    )
    .skip_key(keys::SKIP_CHECK_NETWORK_PING)
    .warn_key(keys::WARN_CHECK_NETWORK_PING)
    .warn_by_default(true)
    .failure_hint("VM is unable to ping external host")
}

pub fn network_http_check() -> CheckDescriptor {
    CheckDescriptor::new(
        "network-http",
        "Checking HTTP connectivity from the VM",
        check_http_connectivity,
    )
    .skip_key(keys::SKIP_CHECK_NETWORK_HTTP)
    .warn_key(keys::WARN_CHECK_NETWORK_HTTP)
    .warn_by_default(true)
    .failure_hint("VM cannot connect to external URL with HTTP")
}

/// The VM must have an IPv4 address.
///
/// Some hypervisor network setups (Hyper-V internal switches) only hand out
/// IPv6 addresses, which later provisioning steps cannot use.
pub fn check_instance_ip(ctx: &mut CheckContext<'_>) -> bool {
    with_driver(ctx, |driver, _out| match driver.ip() {
        Ok(ip) => is_ipv4(&ip),
        Err(e) => {
            debug!(error = %e, "Driver could not report an IP address");
            false
        }
    })
}

/// Whether `address` is an IPv4 literal. IPv4-mapped IPv6 counts as IPv4.
pub fn is_ipv4(address: &str) -> bool {
    match address.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => true,
        Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_some(),
        Err(_) => false,
    }
}

/// Ping an external host from inside the VM
pub fn check_ip_connectivity(ctx: &mut CheckContext<'_>) -> bool {
    let target = configured_or(ctx, keys::NETWORK_PING_HOST, DEFAULT_PING_HOST);
    with_driver(ctx, |driver, out| {
        let _ = write!(out, "\n   Pinging {} ... ", target);
        is_ip_reachable(driver, &target)
    })
}

/// Retrieve a URL from inside the VM; also exposes proxy misconfiguration
pub fn check_http_connectivity(ctx: &mut CheckContext<'_>) -> bool {
    let url = configured_or(ctx, keys::NETWORK_HTTP_HOST, DEFAULT_HTTP_URL);
    with_driver(ctx, |driver, out| {
        let _ = write!(out, "\n   Retrieving {} ... ", url);
        is_retrievable(driver, &url)
    })
}

/// Whether `ip` answers a single ping sent from the VM
pub fn is_ip_reachable(driver: &dyn Driver, ip: &str) -> bool {
    let command = format!("ping -c1 -w1 {}", shell_arg(ip));
    match driver.run_remote_command(&command) {
        Ok(_) => true,
        Err(e) => {
            debug!(target_host = ip, error = %e, "Ping from VM failed");
            false
        }
    }
}

/// Whether `url` can be fetched from the VM
pub fn is_retrievable(driver: &dyn Driver, url: &str) -> bool {
    let command = format!("curl -sSf -o /dev/null {}", shell_arg(url));
    match driver.run_remote_command(&command) {
        Ok(_) => true,
        Err(e) => {
            debug!(url, error = %e, "HTTP retrieval from VM failed");
            false
        }
    }
}

/// Quote `value` for the remote shell. Plain hosts and URLs pass unchanged.
pub fn shell_arg(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+=,".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

fn configured_or(ctx: &CheckContext<'_>, key: &str, default: &str) -> String {
    let value = ctx.settings.lookup_string(key);
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
