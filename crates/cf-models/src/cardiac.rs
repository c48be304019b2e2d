//! Activation waveforms of the heart chambers.

use std::f64::consts::PI;

use cf_core::{ChamberId, Real, ensure_positive};
use cf_elements::{Probe, flag};

use crate::error::{ModelError, ModelResult};
use crate::traits::{OrganModel, StepContext};

/// The four time-varying chambers driven by the heart model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartChambers {
    pub left_atrium: ChamberId,
    pub right_atrium: ChamberId,
    pub left_ventricle: ChamberId,
    pub right_ventricle: ChamberId,
}

/// Converts conduction timing into atrial/ventricular activation factors.
///
/// Within an activation window of length `D` the factor follows
/// `sin(phase - sin(phase) / a)` with `phase = ncc * dt * PI / D`; outside the
/// window it is zero. The shape coefficient `a` skews the waveform.
#[derive(Debug, Clone)]
pub struct CardiacDriver {
    name: String,
    pub is_enabled: bool,
    shape: Real,
    chambers: HeartChambers,
    aaf: Real,
    vaf: Real,
}

impl CardiacDriver {
    /// `shape` must be strictly positive.
    pub fn new(name: impl Into<String>, shape: Real, chambers: HeartChambers) -> ModelResult<Self> {
        let name = name.into();
        let shape = ensure_positive(shape, "a").map_err(ModelError::param(&name, "a"))?;
        Ok(Self {
            name,
            is_enabled: true,
            shape,
            chambers,
            aaf: 0.0,
            vaf: 0.0,
        })
    }

    pub fn shape(&self) -> Real {
        self.shape
    }

    pub fn chambers(&self) -> HeartChambers {
        self.chambers
    }

    /// Atrial activation factor of the last step.
    pub fn aaf(&self) -> Real {
        self.aaf
    }

    /// Ventricular activation factor of the last step.
    pub fn vaf(&self) -> Real {
        self.vaf
    }

    /// Activation factor for contraction counter `ncc` in a window of `duration` seconds.
    pub fn activation(&self, ncc: i64, duration: Real, dt: Real) -> Real {
        if ncc >= 0 && (ncc as Real) < duration / dt {
            let phase = ncc as Real * dt * PI / duration;
            (phase - phase.sin() / self.shape).sin()
        } else {
            0.0
        }
    }
}

impl OrganModel for CardiacDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "heart"
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    fn requires(&self) -> &'static [&'static str] {
        &["ecg"]
    }

    fn driven_chambers(&self) -> Vec<ChamberId> {
        let c = self.chambers;
        vec![c.left_atrium, c.right_atrium, c.left_ventricle, c.right_ventricle]
    }

    fn model_step(&mut self, ctx: &mut StepContext<'_>) {
        if !self.is_enabled {
            return;
        }
        let timing = *ctx.timing;
        self.aaf = self.activation(timing.ncc_atrial, timing.atrial_duration, ctx.dt);
        self.vaf = self.activation(timing.ncc_ventricular, timing.ventricular_duration, ctx.dt);

        let HeartChambers {
            left_atrium,
            right_atrium,
            left_ventricle,
            right_ventricle,
        } = self.chambers;
        ctx.chambers[right_atrium.index()].activation_factor = self.aaf;
        ctx.chambers[right_ventricle.index()].activation_factor = self.vaf;
        ctx.chambers[left_atrium.index()].activation_factor = self.aaf;
        ctx.chambers[left_ventricle.index()].activation_factor = self.vaf;
    }
}

const CARDIAC_FIELDS: &[&str] = &["aaf", "vaf", "a", "is_enabled"];

impl Probe for CardiacDriver {
    fn fields(&self) -> &'static [&'static str] {
        CARDIAC_FIELDS
    }

    fn read(&self, field: &str) -> Option<Real> {
        match field {
            "aaf" => Some(self.aaf),
            "vaf" => Some(self.vaf),
            "a" => Some(self.shape),
            "is_enabled" => Some(flag(self.is_enabled)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ActivationTiming;
    use cf_elements::{Chamber, ChamberParams};

    const DT: Real = 0.001;

    fn heart_chambers() -> (Vec<Chamber>, HeartChambers) {
        let chambers = ["LA", "RA", "LV", "RV"]
            .iter()
            .map(|name| Chamber::time_varying(*name, ChamberParams::new(10.0, 5.0, 1.0), 10.0).unwrap())
            .collect();
        let ids = HeartChambers {
            left_atrium: ChamberId::from_index(0),
            right_atrium: ChamberId::from_index(1),
            left_ventricle: ChamberId::from_index(2),
            right_ventricle: ChamberId::from_index(3),
        };
        (chambers, ids)
    }

    #[test]
    fn declares_ecg_dependency_and_driven_chambers() {
        let (_, ids) = heart_chambers();
        let heart = CardiacDriver::new("heart", 1.5, ids).unwrap();
        assert_eq!(heart.requires(), &["ecg"]);
        let driven: Vec<usize> = heart.driven_chambers().iter().map(|id| id.index()).collect();
        assert_eq!(driven, vec![0, 1, 2, 3]);
        assert_eq!(flag(heart.is_enabled), heart.read("is_enabled").unwrap());
    }

    #[test]
    fn activation_zero_outside_window() {
        let (_, ids) = heart_chambers();
        let heart = CardiacDriver::new("heart", 1.5, ids).unwrap();
        assert_eq!(heart.activation(-1, 0.2, DT), 0.0);
        assert_eq!(heart.activation(250, 0.2, DT), 0.0);
        assert_eq!(heart.activation(0, 0.2, DT), 0.0);
    }

    #[test]
    fn activation_rises_then_falls() {
        let (_, ids) = heart_chambers();
        let heart = CardiacDriver::new("heart", 1.5, ids).unwrap();
        let samples: Vec<Real> = (0..200).map(|n| heart.activation(n, 0.2, DT)).collect();
        let (peak_idx, peak) = samples
            .iter()
            .cloned()
            .enumerate()
            .fold((0, Real::MIN), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
        assert!(peak > 0.9 && peak <= 1.0);
        assert!(peak_idx > 0 && peak_idx < 199);
        assert!(samples[199] < peak);
    }

    #[test]
    fn writes_factors_into_heart_chambers() {
        let (mut chambers, ids) = heart_chambers();
        let mut heart = CardiacDriver::new("heart", 1.5, ids).unwrap();
        let mut timing = ActivationTiming {
            ncc_atrial: 50,
            ncc_ventricular: -1,
            atrial_duration: 0.16,
            ventricular_duration: 0.35,
        };
        let mut ctx = StepContext {
            dt: DT,
            clock: 0.0,
            chambers: &mut chambers,
            timing: &mut timing,
        };
        heart.model_step(&mut ctx);

        assert!(heart.aaf() > 0.0);
        assert_eq!(heart.vaf(), 0.0);
        assert_eq!(chambers[0].activation_factor, heart.aaf());
        assert_eq!(chambers[1].activation_factor, heart.aaf());
        assert_eq!(chambers[2].activation_factor, 0.0);
        assert_eq!(chambers[3].activation_factor, 0.0);
    }

    #[test]
    fn rejects_zero_shape() {
        let (_, ids) = heart_chambers();
        let err = CardiacDriver::new("heart", 0.0, ids).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { field: "a", .. }));
    }
}
