//! Fixed-step network engine for cardioflow.
//!
//! Provides:
//! - [`NetworkBuilder`]: registers chambers, vessels and organ models and
//!   resolves every name reference once, at build time
//! - [`NetworkEngine`]: owns the network and advances it by whole steps in a
//!   fixed phase order (see [`StepPhase`])
//! - [`compile`]: turns a validated [`cf_project::Definition`] into an engine
//! - [`Datacollector`]: samples `component.field` paths while the engine runs
//!
//! # Example
//!
//! ```
//! use cf_elements::{ChamberParams, VesselKind, VesselParams};
//! use cf_engine::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new(0.01);
//! builder.add_compliance("A", ChamberParams::new(100.0, 50.0, 1.0)).unwrap();
//! builder.add_compliance("B", ChamberParams::new(0.0, 0.0, 1.0)).unwrap();
//! builder.add_vessel("A_B", VesselKind::Resistor, "A", "B", VesselParams::new(1.0, 1.0));
//! let mut engine = builder.build().unwrap();
//!
//! engine.advance(1.0).unwrap();
//! assert!((engine.total_volume() - 100.0).abs() < 1e-9);
//! ```

pub mod builder;
pub mod compile;
pub mod datacollector;
pub mod engine;
pub mod error;
pub mod network;

pub use builder::NetworkBuilder;
pub use compile::{compile, load_engine};
pub use datacollector::{DEFAULT_SAMPLE_INTERVAL, Datacollector, Sample, WatchItem};
pub use engine::{NetworkEngine, STEP_PHASES, StepPhase};
pub use error::{EngineError, EngineResult};
pub use network::{Network, PropertyRef, Target};
