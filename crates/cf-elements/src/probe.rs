//! Named-field lookup used by samplers and the engine's `component.field` paths.

use cf_core::Real;

/// Read access to an element's public numeric attributes by field name.
///
/// Boolean flags read as `0.0` / `1.0`. Unknown field names return `None`.
pub trait Probe {
    /// Field names this element answers to.
    fn fields(&self) -> &'static [&'static str];

    /// Current value of `field`, if it exists.
    fn read(&self, field: &str) -> Option<Real>;
}

/// Boolean flag as a probe value.
pub fn flag(value: bool) -> Real {
    if value { 1.0 } else { 0.0 }
}
