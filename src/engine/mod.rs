//! Preflight engine.
//!
//! Check descriptors, the runner that applies skip / warn / fail policy,
//! phase orchestration and result records.

pub mod descriptor;
pub mod orchestrator;
pub mod result;
pub mod runner;
