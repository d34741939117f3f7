//! Check runner.
//!
//! Applies the skip / warn / fail policy to a single descriptor:
//! 1. Print the message as an in-progress line.
//! 2. Skip override set: print `SKIP`; the predicate never runs.
//! 3. Predicate holds: print `OK`.
//! 4. Predicate fails: print `FAIL` and the hint. The failure is a warning
//!    when the warn override is set *or* the check is advisory by default;
//!    otherwise it is fatal.
//!
//! The runner never terminates the process. A fatal failure comes back as
//! [`CheckOutcome::FailedFatal`] and the caller decides what to do.
//!
//! The hint on the console is the last word on a failure, so failures are
//! logged at `info` and stay out of the default `warn` log output.

use crate::cli::output::{self, StatusToken};
use crate::engine::descriptor::{CheckContext, CheckDescriptor};
use crate::{CheckOutcome, PreflightError};
use tracing::{debug, info};

/// Run one check and return its terminal outcome
pub fn run(
    descriptor: &CheckDescriptor,
    ctx: &mut CheckContext<'_>,
) -> Result<CheckOutcome, PreflightError> {
    output::write_check_start(ctx.out, descriptor.message).map_err(console_error)?;

    let is_skip = ctx.settings.lookup_bool(descriptor.skip_key);
    let is_warn_override = ctx.settings.lookup_bool(descriptor.warn_key);

    if is_skip {
        output::write_status(ctx.out, StatusToken::Skip).map_err(console_error)?;
        debug!(check = descriptor.id, outcome = %CheckOutcome::Skipped, "Check skipped by override");
        return Ok(CheckOutcome::Skipped);
    }

    if descriptor.evaluate(ctx) {
        output::write_status(ctx.out, StatusToken::Ok).map_err(console_error)?;
        debug!(check = descriptor.id, outcome = %CheckOutcome::Passed, "Check passed");
        return Ok(CheckOutcome::Passed);
    }

    output::write_status(ctx.out, StatusToken::Fail).map_err(console_error)?;
    output::write_hint(ctx.out, descriptor.failure_hint).map_err(console_error)?;

    if is_warn_override || descriptor.warn_by_default {
        info!(
            check = descriptor.id,
            outcome = %CheckOutcome::Warned,
            by_default = descriptor.warn_by_default,
            "{}",
            descriptor.failure_hint
        );
        Ok(CheckOutcome::Warned)
    } else {
        info!(check = descriptor.id, outcome = %CheckOutcome::FailedFatal, "{}", descriptor.failure_hint);
        Ok(CheckOutcome::FailedFatal)
    }
}

fn console_error(e: std::io::Error) -> PreflightError {
    PreflightError::io("writing check output", e)
}
