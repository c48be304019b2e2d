//! Organ sub-models for cardioflow.
//!
//! This crate provides the models that run after the element phases of every
//! step. Each model implements [`OrganModel`] and receives a [`StepContext`]
//! giving it the step size, the clock and mutable access to the chambers.
//!
//! # Architecture
//!
//! - [`ConductionSystem`] is the electrical timing state machine (SA node,
//!   PQ, QRS and QT phases). It publishes its contraction counters and
//!   interval lengths on the context's [`ActivationTiming`].
//! - [`CardiacDriver`] turns the published timing into atrial and ventricular
//!   activation factors and writes them into the four heart chambers.
//!
//! The engine runs models in registration order, so a conduction system must
//! be registered before the driver that consumes it.

pub mod cardiac;
pub mod conduction;
pub mod error;
pub mod traits;

pub use cardiac::{CardiacDriver, HeartChambers};
pub use conduction::{ConductionParams, ConductionPhase, ConductionSystem};
pub use error::{ModelError, ModelResult};
pub use traits::{ActivationTiming, OrganModel, StepContext};
