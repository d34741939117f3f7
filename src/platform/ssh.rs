//! Driver backed by the system `ssh` client.

use crate::platform::driver::{Driver, DriverError};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Connection details for a provisioned VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
}

impl SshTarget {
    pub fn new(host: impl Into<String>) -> Self {
        SshTarget {
            host: host.into(),
            user: "docker".to_string(),
            port: 22,
            identity_file: None,
        }
    }
}

/// Runs remote commands by spawning `ssh`.
#[derive(Debug, Clone)]
pub struct SshDriver {
    target: SshTarget,
    program: String,
}

impl SshDriver {
    pub fn new(target: SshTarget) -> Self {
        SshDriver {
            target,
            program: "ssh".to_string(),
        }
    }

    /// Use a different client binary (e.g. an absolute path to `ssh`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the client for `command`.
    ///
    /// VMs are recreated often, so host keys are neither checked nor recorded.
    pub fn build_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "-o".to_string(),
            "LogLevel=quiet".to_string(),
            "-p".to_string(),
            self.target.port.to_string(),
        ];
        if let Some(identity) = &self.target.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args.push(format!("{}@{}", self.target.user, self.target.host));
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

impl Driver for SshDriver {
    fn ip(&self) -> Result<String, DriverError> {
        if self.target.host.trim().is_empty() {
            return Err(DriverError::NoAddress);
        }
        Ok(self.target.host.clone())
    }

    fn run_remote_command(&self, command: &str) -> Result<String, DriverError> {
        debug!(host = %self.target.host, command, "Running remote command");

        let output = Command::new(&self.program)
            .args(self.build_args(command))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| DriverError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            let status = output.status.code().unwrap_or(255);
            debug!(host = %self.target.host, status, "Remote command failed");
            return Err(DriverError::CommandFailed {
                status,
                output: combined,
            });
        }

        Ok(combined)
    }
}
