//! Virtual machine driver interface.
//!
//! A driver yields the VM's network address and runs shell commands on the
//! VM, returning their combined output.

use std::fmt;
use thiserror::Error;

/// Errors reported by a VM driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The remote command channel could not be started
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote command exited unsuccessfully
    #[error("remote command exited with status {status}: {output}")]
    CommandFailed { status: i32, output: String },

    /// The driver has no address for the VM
    #[error("no IP address available for the VM")]
    NoAddress,
}

/// Capability to talk to a provisioned VM.
pub trait Driver {
    /// The VM's network address as reported by the driver
    fn ip(&self) -> Result<String, DriverError>;

    /// Run `command` on the VM and return its combined stdout and stderr
    fn run_remote_command(&self, command: &str) -> Result<String, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn ip(&self) -> Result<String, DriverError> {
        (**self).ip()
    }

    fn run_remote_command(&self, command: &str) -> Result<String, DriverError> {
        (**self).run_remote_command(command)
    }
}

/// Hypervisor driver families known to the preflight engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// xhyve on macOS
    Xhyve,
    /// KVM on Linux
    Kvm,
    /// Hyper-V on Windows
    HyperV,
    /// VirtualBox on any host
    VirtualBox,
    /// VMware Fusion on macOS
    VmwareFusion,
}

impl DriverKind {
    /// All known driver kinds
    pub const ALL: [DriverKind; 5] = [
        DriverKind::Xhyve,
        DriverKind::Kvm,
        DriverKind::HyperV,
        DriverKind::VirtualBox,
        DriverKind::VmwareFusion,
    ];

    /// Parse a configured driver name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "xhyve" => Some(DriverKind::Xhyve),
            "kvm" => Some(DriverKind::Kvm),
            "hyperv" => Some(DriverKind::HyperV),
            "virtualbox" => Some(DriverKind::VirtualBox),
            "vmwarefusion" => Some(DriverKind::VmwareFusion),
            _ => None,
        }
    }

    /// The configuration name of this driver
    pub fn name(self) -> &'static str {
        match self {
            DriverKind::Xhyve => "xhyve",
            DriverKind::Kvm => "kvm",
            DriverKind::HyperV => "hyperv",
            DriverKind::VirtualBox => "virtualbox",
            DriverKind::VmwareFusion => "vmwarefusion",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
