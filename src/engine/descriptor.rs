//! Check descriptors and the context handed to predicates.

use crate::config::Overrides;
use crate::platform::driver::Driver;
use crate::platform::host::HostProbe;
use std::fmt;
use std::io::Write;

/// Everything a predicate may use while it runs.
///
/// Checks that need the provisioned VM read `driver`; checks that run before
/// the VM exists get `None` there.
pub struct CheckContext<'a> {
    /// Console the check prints supplementary text to
    pub out: &'a mut dyn Write,
    pub settings: &'a dyn Overrides,
    pub host: &'a dyn HostProbe,
    pub driver: Option<&'a dyn Driver>,
}

/// Boolean check logic: `true` when the condition holds.
pub type Predicate = Box<dyn Fn(&mut CheckContext<'_>) -> bool>;

/// Declarative binding of a predicate to its overrides and severity.
pub struct CheckDescriptor {
    /// Stable identifier (e.g. "storage-mount")
    pub id: &'static str,
    /// Shown while the check runs
    pub message: &'static str,
    /// When this override is true the check does not run
    pub skip_key: &'static str,
    /// When this override is true a failure only warns
    pub warn_key: &'static str,
    /// Failures of this check only warn, regardless of `warn_key`
    pub warn_by_default: bool,
    /// Shown only when the predicate fails
    pub failure_hint: &'static str,
    pub predicate: Predicate,
}

impl CheckDescriptor {
    pub fn new(
        id: &'static str,
        message: &'static str,
        predicate: impl Fn(&mut CheckContext<'_>) -> bool + 'static,
    ) -> Self {
        CheckDescriptor {
            id,
            message,
            skip_key: "",
            warn_key: "",
            warn_by_default: false,
            failure_hint: "",
            predicate: Box::new(predicate),
        }
    }

    pub fn skip_key(mut self, key: &'static str) -> Self {
        self.skip_key = key;
        self
    }

    pub fn warn_key(mut self, key: &'static str) -> Self {
        self.warn_key = key;
        self
    }

    pub fn warn_by_default(mut self, warn: bool) -> Self {
        self.warn_by_default = warn;
        self
    }

    pub fn failure_hint(mut self, hint: &'static str) -> Self {
        self.failure_hint = hint;
        self
    }

    /// Evaluate the predicate
    pub fn evaluate(&self, ctx: &mut CheckContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for CheckDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDescriptor")
            .field("id", &self.id)
            .field("message", &self.message)
            .field("skip_key", &self.skip_key)
            .field("warn_key", &self.warn_key)
            .field("warn_by_default", &self.warn_by_default)
            .field("failure_hint", &self.failure_hint)
            .finish_non_exhaustive()
    }
}
