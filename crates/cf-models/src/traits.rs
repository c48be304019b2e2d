//! Capability interface shared by every organ sub-model.

use cf_core::{ChamberId, Real};
use cf_elements::{Chamber, Probe};

/// Cardiac timing published by the conduction system for downstream models.
///
/// Contraction counters are step counts since the last activation (a phase
/// index, not a time). Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationTiming {
    pub ncc_atrial: i64,
    pub ncc_ventricular: i64,
    pub atrial_duration: Real,
    pub ventricular_duration: Real,
}

impl Default for ActivationTiming {
    fn default() -> Self {
        Self {
            ncc_atrial: -1,
            ncc_ventricular: -1,
            atrial_duration: 0.0,
            ventricular_duration: 0.0,
        }
    }
}

/// Shared network state handed to a model for one step.
pub struct StepContext<'a> {
    /// Fixed step size (seconds)
    pub dt: Real,
    /// Model clock at the start of this step (seconds)
    pub clock: Real,
    /// Chamber registry, indexed by `ChamberId`
    pub chambers: &'a mut [Chamber],
    pub timing: &'a mut ActivationTiming,
}

/// A sub-model advanced once per step after the element phases.
pub trait OrganModel: Probe {
    fn name(&self) -> &str;

    /// Short kind tag (matches the definition `subtype`).
    fn kind(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Overwrite a writable parameter between runs. Returns `false` when the
    /// field is unknown, read-only, or the value is out of range.
    fn write(&mut self, _field: &str, _value: Real) -> bool {
        false
    }

    /// Kinds of the models that must step before this one.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    /// Chambers whose activation factor this model writes. They must be
    /// time-varying elastances.
    fn driven_chambers(&self) -> Vec<ChamberId> {
        Vec::new()
    }

    /// Advance one step. A disabled model must leave all state untouched.
    fn model_step(&mut self, ctx: &mut StepContext<'_>);
}
