//! Preflight check predicates.
//!
//! Each predicate answers one yes/no question about the environment:
//! - Driver: is the hypervisor driver for the configured VM driver usable?
//! - Network: does the VM have an IPv4 address and outbound connectivity?
//! - Storage: is the persistent volume mounted and not full?
//!
//! Predicates never fail loudly. Remote command errors and parse errors are
//! folded into `false`; any detail worth showing is printed to the check
//! context's console before returning.
//!
//! Those console writes are best effort. A predicate only returns a bool, and
//! a console that stops accepting output also rejects the status token the
//! runner writes next, so the failure still comes back as
//! [`PreflightError::Io`](crate::PreflightError::Io).

pub mod driver;
pub mod network;
pub mod storage;

use crate::engine::descriptor::CheckContext;
use crate::platform::driver::Driver;
use std::io::Write;
use tracing::warn;

/// Run `check` against the context's driver; `false` when there is none.
pub(crate) fn with_driver(
    ctx: &mut CheckContext<'_>,
    check: impl FnOnce(&dyn Driver, &mut dyn Write) -> bool,
) -> bool {
    match ctx.driver {
        Some(driver) => check(driver, &mut *ctx.out),
        None => {
            warn!("Check requires a VM driver but none is available");
            false
        }
    }
}
