//! Platform abstraction layer.
//!
//! Provides consistent interfaces for:
//! - The VM driver (address lookup and remote commands)
//! - Host-local facts (search path, file modes, environment)
//! - An `ssh`-backed driver implementation

pub mod driver;
pub mod host;
pub mod ssh;
