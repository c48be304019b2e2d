//! Fixed-step network engine.

use cf_core::{PerfStats, Real, Timer, ensure_finite};
use cf_elements::{Chamber, Vessel};
use cf_models::{ActivationTiming, OrganModel, StepContext};
use tracing::info;

use crate::datacollector::Datacollector;
use crate::error::{EngineError, EngineResult};
use crate::network::{Network, PropertyRef};

/// The phases of one step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Pressure of every time-varying chamber from its volume and activation.
    TimeVaryingPressure,
    /// Pressure of every plain compliance.
    PlainPressure,
    /// Flow of every vessel, moving the volume of one step.
    VesselFlow,
    /// Organ models in registration order.
    Models,
    /// Clock advance by one step.
    Clock,
}

/// Every step runs these phases in this order.
pub const STEP_PHASES: [StepPhase; 5] = [
    StepPhase::TimeVaryingPressure,
    StepPhase::PlainPressure,
    StepPhase::VesselFlow,
    StepPhase::Models,
    StepPhase::Clock,
];

/// Owns a resolved network and advances it with a fixed step size.
///
/// The step size never changes after construction. Activation factors
/// written by the models in one step are read by the pressure phases of the
/// next.
pub struct NetworkEngine {
    name: String,
    description: String,
    weight: Option<Real>,
    dt: Real,
    clock: Real,
    network: Network,
    timing: ActivationTiming,
    datacollector: Datacollector,
    perf: PerfStats,
}

impl NetworkEngine {
    pub(crate) fn new(
        network: Network,
        dt: Real,
        name: String,
        description: String,
        weight: Option<Real>,
    ) -> Self {
        Self {
            name,
            description,
            weight,
            dt,
            clock: 0.0,
            network,
            timing: ActivationTiming::default(),
            datacollector: Datacollector::new(),
            perf: PerfStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Body weight in kg, when the definition gave one.
    pub fn weight(&self) -> Option<Real> {
        self.weight
    }

    pub fn dt(&self) -> Real {
        self.dt
    }

    /// Simulated seconds since construction.
    pub fn clock(&self) -> Real {
        self.clock
    }

    pub fn perf(&self) -> &PerfStats {
        &self.perf
    }

    /// Conduction timing as published by the last model phase.
    pub fn timing(&self) -> &ActivationTiming {
        &self.timing
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn datacollector(&self) -> &Datacollector {
        &self.datacollector
    }

    pub fn datacollector_mut(&mut self) -> &mut Datacollector {
        &mut self.datacollector
    }

    pub fn chamber(&self, name: &str) -> Option<&Chamber> {
        self.network.chamber(name)
    }

    pub fn chamber_mut(&mut self, name: &str) -> Option<&mut Chamber> {
        self.network.chamber_mut(name)
    }

    pub fn vessel(&self, name: &str) -> Option<&Vessel> {
        self.network.vessel(name)
    }

    pub fn vessel_mut(&mut self, name: &str) -> Option<&mut Vessel> {
        self.network.vessel_mut(name)
    }

    pub fn model(&self, name: &str) -> Option<&dyn OrganModel> {
        self.network.model(name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut (dyn OrganModel + 'static)> {
        self.network.model_mut(name)
    }

    pub fn total_volume(&self) -> Real {
        self.network.total_volume()
    }

    /// Enable or disable a chamber, vessel or model by name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> EngineResult<()> {
        if let Some(chamber) = self.network.chamber_mut(name) {
            chamber.is_enabled = enabled;
        } else if let Some(vessel) = self.network.vessel_mut(name) {
            vessel.is_enabled = enabled;
        } else if let Some(model) = self.network.model_mut(name) {
            model.set_enabled(enabled);
        } else {
            return Err(EngineError::UnknownComponent(name.to_string()));
        }
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> EngineResult<PropertyRef> {
        self.network.resolve(path)
    }

    /// Current value of a `component.field` path.
    pub fn read(&self, path: &str) -> EngineResult<Real> {
        self.network.read(path)
    }

    /// Overwrite a writable model parameter, e.g. `ecg.heart_rate`.
    pub fn write(&mut self, path: &str, value: Real) -> EngineResult<()> {
        let (component, field) = path
            .split_once('.')
            .ok_or_else(|| EngineError::MalformedPath(path.to_string()))?;
        let model = self
            .network
            .model_mut(component)
            .ok_or_else(|| EngineError::UnknownComponent(component.to_string()))?;
        if model.write(field, value) {
            Ok(())
        } else {
            Err(EngineError::InvalidArg {
                what: format!("cannot write {value} to {path}"),
            })
        }
    }

    /// Add a labelled path to the datacollector's watch list.
    pub fn watch(&mut self, label: impl Into<String>, path: &str) -> EngineResult<()> {
        self.datacollector
            .add_to_watchlist(label, path, &self.network)
    }

    pub fn set_sample_interval(&mut self, interval: Real) -> EngineResult<()> {
        self.datacollector.set_sample_interval(interval, self.dt)
    }

    /// Run `floor(total_time / dt)` steps and return the number of steps run.
    pub fn advance(&mut self, total_time: Real) -> EngineResult<u64> {
        let total_time =
            ensure_finite(total_time, "total_time").map_err(|e| EngineError::InvalidArg {
                what: e.to_string(),
            })?;
        if total_time < 0.0 {
            return Err(EngineError::InvalidArg {
                what: format!("total_time must be >= 0, got {total_time}"),
            });
        }

        let steps = (total_time / self.dt).floor() as u64;
        let timer = Timer::start("advance");
        for _ in 0..steps {
            self.step();
        }
        let wall_s = timer.stop();
        self.perf.record(steps, wall_s);

        info!(
            model = %self.name,
            steps,
            wall_s,
            avg_step_ms = self.perf.last_average_step_ms(),
            clock = self.clock,
            "advance complete"
        );
        Ok(steps)
    }

    /// Run exactly one step, then let the datacollector sample.
    pub fn step(&mut self) {
        for phase in STEP_PHASES {
            self.run_phase(phase);
        }
        self.datacollector
            .collect(self.clock, self.dt, &self.network);
    }

    fn run_phase(&mut self, phase: StepPhase) {
        let network = &mut self.network;
        match phase {
            StepPhase::TimeVaryingPressure => {
                for id in &network.time_varying_ids {
                    network.chambers[id.index()].recompute_pressure();
                }
            }
            StepPhase::PlainPressure => {
                for id in &network.plain_ids {
                    network.chambers[id.index()].recompute_pressure();
                }
            }
            StepPhase::VesselFlow => {
                for vessel in &mut network.vessels {
                    vessel.recompute_flow(&mut network.chambers, self.dt);
                }
            }
            StepPhase::Models => {
                let mut ctx = StepContext {
                    dt: self.dt,
                    clock: self.clock,
                    chambers: &mut network.chambers,
                    timing: &mut self.timing,
                };
                for model in &mut network.models {
                    model.model_step(&mut ctx);
                }
            }
            StepPhase::Clock => self.clock += self.dt,
        }
    }
}



impl std::fmt::Debug for NetworkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkEngine")
            .field("name", &self.name)
            .field("dt", &self.dt)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
