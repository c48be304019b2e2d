//! Electrical timing of the heart (ECG-equivalent state machine).
//!
//! One SA-node timer fires the atria every `60 / heart_rate` seconds. The
//! PQ phase then runs for `pq_time`; when it ends the ventricles depolarise
//! (QRS) unless they are still refractory, and repolarise during the
//! heart-rate corrected QT phase. All timers advance by the step size.

use cf_core::{Real, ensure_non_negative, ensure_positive};
use cf_elements::{Probe, flag};

use crate::error::{ModelError, ModelResult};
use crate::traits::{OrganModel, StepContext};

/// SA-node period used when the heart rate is not positive.
const FALLBACK_SA_PERIOD: Real = 60.0;
/// Heart rate floor of the QT correction.
const QTC_MIN_HEART_RATE: Real = 10.0;
/// Window of the measured heart rate.
const MEASURE_WINDOW: Real = 5.0;

/// Independent parameters of a conduction system.
#[derive(Debug, Clone, PartialEq)]
pub struct ConductionParams {
    /// Beats per minute
    pub heart_rate: Real,
    /// Atrial depolarisation plus PR gap (seconds)
    pub pq_time: Real,
    /// Ventricular depolarisation (seconds)
    pub qrs_time: Real,
    /// Uncorrected QT interval at 60 bpm (seconds)
    pub qt_time: Real,
    pub is_enabled: bool,
}

impl Default for ConductionParams {
    fn default() -> Self {
        Self {
            heart_rate: 60.0,
            pq_time: 0.16,
            qrs_time: 0.1,
            qt_time: 0.35,
            is_enabled: true,
        }
    }
}

/// Coarse electrical phase of the heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductionPhase {
    Idle,
    /// P wave and PR gap
    Atrial,
    /// Ventricular depolarisation
    Qrs,
    /// Ventricular repolarisation (refractory)
    Qt,
}

#[derive(Debug, Clone)]
pub struct ConductionSystem {
    name: String,
    pub is_enabled: bool,
    pub heart_rate: Real,
    pub pq_time: Real,
    pub qrs_time: Real,
    pub qt_time: Real,
    /// Corrected QT minus QRS, recomputed every step
    cqt_time: Real,
    ncc_atrial: i64,
    ncc_ventricular: i64,
    measured_heart_rate: Real,
    ecg_signal: Real,

    sa_node_period: Real,
    sa_node_counter: Real,
    pq_running: bool,
    pq_time_counter: Real,
    qrs_running: bool,
    qrs_time_counter: Real,
    qt_running: bool,
    qt_time_counter: Real,
    ventricle_is_refractory: bool,
    measured_hr_time_counter: Real,
    measured_qrs_counter: u32,
    p_wave_signal_counter: u64,
    qrs_wave_signal_counter: u64,
    t_wave_signal_counter: u64,
}

impl ConductionSystem {
    pub fn new(name: impl Into<String>, params: ConductionParams) -> ModelResult<Self> {
        let name = name.into();
        let heart_rate = ensure_non_negative(params.heart_rate, "heart_rate")
            .map_err(ModelError::param(&name, "heart_rate"))?;
        let pq_time = ensure_positive(params.pq_time, "pq_time")
            .map_err(ModelError::param(&name, "pq_time"))?;
        let qrs_time = ensure_positive(params.qrs_time, "qrs_time")
            .map_err(ModelError::param(&name, "qrs_time"))?;
        let qt_time = ensure_positive(params.qt_time, "qt_time")
            .map_err(ModelError::param(&name, "qt_time"))?;

        Ok(Self {
            name,
            is_enabled: params.is_enabled,
            heart_rate,
            pq_time,
            qrs_time,
            qt_time,
            cqt_time: 0.3,
            ncc_atrial: 0,
            ncc_ventricular: -1,
            measured_heart_rate: 0.0,
            ecg_signal: 0.0,
            sa_node_period: 0.0,
            sa_node_counter: 0.0,
            pq_running: false,
            pq_time_counter: 0.0,
            qrs_running: false,
            qrs_time_counter: 0.0,
            qt_running: false,
            qt_time_counter: 0.0,
            ventricle_is_refractory: false,
            measured_hr_time_counter: 0.0,
            measured_qrs_counter: 0,
            p_wave_signal_counter: 0,
            qrs_wave_signal_counter: 0,
            t_wave_signal_counter: 0,
        })
    }

    /// Heart-rate corrected QT time (Bazett), with a 10 bpm floor.
    pub fn qtc(&self) -> Real {
        let hr = if self.heart_rate > QTC_MIN_HEART_RATE {
            self.heart_rate
        } else {
            QTC_MIN_HEART_RATE
        };
        self.qt_time * (60.0 / hr).sqrt()
    }

    pub fn cqt_time(&self) -> Real {
        self.cqt_time
    }

    pub fn ncc_atrial(&self) -> i64 {
        self.ncc_atrial
    }

    pub fn ncc_ventricular(&self) -> i64 {
        self.ncc_ventricular
    }

    pub fn measured_heart_rate(&self) -> Real {
        self.measured_heart_rate
    }

    pub fn is_refractory(&self) -> bool {
        self.ventricle_is_refractory
    }

    /// Duration of the atrial activation window (seconds).
    pub fn atrial_duration(&self) -> Real {
        self.pq_time
    }

    /// Duration of the ventricular activation window (seconds).
    pub fn ventricular_duration(&self) -> Real {
        self.qrs_time + self.cqt_time
    }

    pub fn phase(&self) -> ConductionPhase {
        if self.qrs_running {
            ConductionPhase::Qrs
        } else if self.qt_running {
            ConductionPhase::Qt
        } else if self.pq_running {
            ConductionPhase::Atrial
        } else {
            ConductionPhase::Idle
        }
    }

    /// Advance the state machine by one step of `dt` seconds.
    pub fn cycle(&mut self, dt: Real) {
        self.cqt_time = self.qtc() - self.qrs_time;

        self.sa_node_period = if self.heart_rate > 0.0 {
            60.0 / self.heart_rate
        } else {
            FALLBACK_SA_PERIOD
        };

        if self.sa_node_counter > self.sa_node_period {
            self.sa_node_counter = 0.0;
            self.pq_running = true;
            self.ncc_atrial = -1;
        }

        if self.pq_time_counter > self.pq_time {
            self.pq_time_counter = 0.0;
            self.pq_running = false;
            if !self.ventricle_is_refractory {
                self.qrs_running = true;
                self.ncc_ventricular = -1;
                self.measured_qrs_counter += 1;
            }
        }

        if self.qrs_time_counter > self.qrs_time {
            self.qrs_time_counter = 0.0;
            self.ecg_signal = 0.0;
            self.qrs_running = false;
            self.qt_running = true;
            self.ventricle_is_refractory = true;
        }

        if self.qt_time_counter > self.cqt_time {
            self.qt_time_counter = 0.0;
            self.qt_running = false;
            self.ventricle_is_refractory = false;
        }

        self.sa_node_counter += dt;

        if self.pq_running {
            self.pq_time_counter += dt;
            self.p_wave_signal_counter += 1;
        } else {
            self.p_wave_signal_counter = 0;
        }

        if self.qrs_running {
            self.qrs_time_counter += dt;
            self.qrs_wave_signal_counter += 1;
        } else {
            self.qrs_wave_signal_counter = 0;
        }

        if self.qt_running {
            self.qt_time_counter += dt;
            self.t_wave_signal_counter += 1;
        } else {
            self.t_wave_signal_counter = 0;
        }

        // no waveform synthesis: the signal stays flat
        if !self.pq_running && !self.qrs_running && !self.qt_running {
            self.ecg_signal = 0.0;
        }

        if self.measured_hr_time_counter > MEASURE_WINDOW {
            self.measured_heart_rate = 60.0
                / (self.measured_hr_time_counter / Real::from(self.measured_qrs_counter));
            tracing::debug!(
                model = %self.name,
                measured_heart_rate = self.measured_heart_rate,
                "measured heart rate updated"
            );
            self.measured_qrs_counter = 0;
            self.measured_hr_time_counter = 0.0;
        }
        self.measured_hr_time_counter += dt;

        self.ncc_atrial += 1;
        self.ncc_ventricular += 1;
    }
}

impl OrganModel for ConductionSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "ecg"
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    fn write(&mut self, field: &str, value: Real) -> bool {
        let slot = match field {
            "heart_rate" if value.is_finite() && value >= 0.0 => &mut self.heart_rate,
            "pq_time" if value.is_finite() && value > 0.0 => &mut self.pq_time,
            "qrs_time" if value.is_finite() && value > 0.0 => &mut self.qrs_time,
            "qt_time" if value.is_finite() && value > 0.0 => &mut self.qt_time,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn model_step(&mut self, ctx: &mut StepContext<'_>) {
        if !self.is_enabled {
            return;
        }
        self.cycle(ctx.dt);

        ctx.timing.ncc_atrial = self.ncc_atrial;
        ctx.timing.ncc_ventricular = self.ncc_ventricular;
        ctx.timing.atrial_duration = self.atrial_duration();
        ctx.timing.ventricular_duration = self.ventricular_duration();
    }
}

const CONDUCTION_FIELDS: &[&str] = &[
    "heart_rate",
    "pq_time",
    "qrs_time",
    "qt_time",
    "cqt_time",
    "ncc_atrial",
    "ncc_ventricular",
    "measured_heart_rate",
    "ecg_signal",
    "ventricle_is_refractory",
    "p_wave_signal_counter",
    "qrs_wave_signal_counter",
    "t_wave_signal_counter",
    "is_enabled",
];

impl Probe for ConductionSystem {
    fn fields(&self) -> &'static [&'static str] {
        CONDUCTION_FIELDS
    }

    fn read(&self, field: &str) -> Option<Real> {
        let value = match field {
            "heart_rate" => self.heart_rate,
            "pq_time" => self.pq_time,
            "qrs_time" => self.qrs_time,
            "qt_time" => self.qt_time,
            "cqt_time" => self.cqt_time,
            "ncc_atrial" => self.ncc_atrial as Real,
            "ncc_ventricular" => self.ncc_ventricular as Real,
            "measured_heart_rate" => self.measured_heart_rate,
            "ecg_signal" => self.ecg_signal,
            "ventricle_is_refractory" => flag(self.ventricle_is_refractory),
            "p_wave_signal_counter" => self.p_wave_signal_counter as Real,
            "qrs_wave_signal_counter" => self.qrs_wave_signal_counter as Real,
            "t_wave_signal_counter" => self.t_wave_signal_counter as Real,
            "is_enabled" => flag(self.is_enabled),
            _ => return None,
        };
        Some(value)
    }
}
