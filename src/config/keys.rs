//! Well-known override keys.
//!
//! `skip-check-*` keys disable a check entirely; `warn-check-*` keys turn a
//! failure of that check into a warning.

/// Name of the configured VM driver (`xhyve`, `kvm`, `hyperv`, ...)
pub const VM_DRIVER: &str = "vm-driver";

pub const SKIP_CHECK_XHYVE_DRIVER: &str = "skip-check-xhyve-driver";
pub const WARN_CHECK_XHYVE_DRIVER: &str = "warn-check-xhyve-driver";
pub const SKIP_CHECK_KVM_DRIVER: &str = "skip-check-kvm-driver";
pub const WARN_CHECK_KVM_DRIVER: &str = "warn-check-kvm-driver";
pub const SKIP_CHECK_HYPERV_DRIVER: &str = "skip-check-hyperv-driver";
pub const WARN_CHECK_HYPERV_DRIVER: &str = "warn-check-hyperv-driver";

pub const SKIP_CHECK_INSTANCE_IP: &str = "skip-check-instance-ip";
pub const WARN_CHECK_INSTANCE_IP: &str = "warn-check-instance-ip";

pub const SKIP_CHECK_NETWORK_PING: &str = "skip-check-network-ping";
pub const WARN_CHECK_NETWORK_PING: &str = "warn-check-network-ping";
/// Host pinged from inside the VM
pub const NETWORK_PING_HOST: &str = "network-ping-host";

pub const SKIP_CHECK_NETWORK_HTTP: &str = "skip-check-network-http";
pub const WARN_CHECK_NETWORK_HTTP: &str = "warn-check-network-http";
/// URL retrieved from inside the VM
pub const NETWORK_HTTP_HOST: &str = "network-http-host";

pub const SKIP_CHECK_STORAGE_MOUNT: &str = "skip-check-storage-mount";
pub const WARN_CHECK_STORAGE_MOUNT: &str = "warn-check-storage-mount";
pub const SKIP_CHECK_STORAGE_USAGE: &str = "skip-check-storage-usage";
pub const WARN_CHECK_STORAGE_USAGE: &str = "warn-check-storage-usage";

/// Whether `key` names a skip or warn toggle, whose value must be a boolean
pub fn is_toggle(key: &str) -> bool {
    key.starts_with("skip-check-") || key.starts_with("warn-check-")
}
