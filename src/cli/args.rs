//! Command line arguments.

use crate::platform::ssh::SshTarget;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Parsed command line arguments
#[derive(Debug, Parser)]
#[command(name = "vm-preflight")]
#[command(about = "Preflight checks for hypervisor-backed VM provisioning")]
pub struct Args {
    /// Load overrides from a TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set an override, e.g. --set skip-check-network-ping=true (repeatable)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Write a JSON report of the executed checks
    #[arg(long, global = true, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Command to execute
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the checks that precede host creation
    Before(BeforeArgs),
    /// Run the checks against a running VM
    After(VmArgs),
    /// Run both phases; a fatal driver check prevents the VM checks
    Run {
        #[command(flatten)]
        before: BeforeArgs,
        #[command(flatten)]
        vm: VmArgs,
    },
    /// List all available checks
    List,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, ClapArgs)]
pub struct BeforeArgs {
    /// VM driver to check (xhyve, kvm, hyperv, virtualbox, vmwarefusion)
    #[arg(long, value_name = "NAME")]
    pub vm_driver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, ClapArgs)]
pub struct VmArgs {
    /// Address of the VM
    #[arg(long)]
    pub host: String,

    #[arg(long, default_value = "docker")]
    pub ssh_user: String,

    #[arg(long, default_value_t = 22)]
    pub ssh_port: u16,

    /// Private key used to log into the VM
    #[arg(long, value_name = "FILE")]
    pub ssh_key: Option<PathBuf>,
}

impl VmArgs {
    /// SSH connection details for the VM
    pub fn ssh_target(&self) -> SshTarget {
        SshTarget {
            host: self.host.clone(),
            user: self.ssh_user.clone(),
            port: self.ssh_port,
            identity_file: self.ssh_key.clone(),
        }
    }
}

impl Args {
    /// Log filter directive implied by `-v` flags
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
