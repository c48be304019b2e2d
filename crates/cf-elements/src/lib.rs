//! cf-elements: element library for lumped cardiovascular networks.
//!
//! Provides the two building blocks of a network:
//! - [`Chamber`]: a volume reservoir (plain compliance or time-varying
//!   elastance) whose pressure is a pure function of its stored volume
//! - [`Vessel`]: a resistor or valve that moves volume between two chambers
//!   according to their pressure difference
//!
//! Elements are validated when they are constructed. The per-step methods
//! (`recompute_pressure`, `recompute_flow`) never fail.
//!
//! # Example
//!
//! ```
//! use cf_core::ChamberId;
//! use cf_elements::{Chamber, ChamberParams, Vessel, VesselKind, VesselParams};
//!
//! let a = Chamber::compliance("A", ChamberParams::new(100.0, 50.0, 1.0)).unwrap();
//! let b = Chamber::compliance("B", ChamberParams::new(0.0, 0.0, 1.0)).unwrap();
//! let mut chambers = vec![a, b];
//!
//! let mut vessel = Vessel::new(
//!     "A_B",
//!     VesselKind::Resistor,
//!     ChamberId::from_index(0),
//!     ChamberId::from_index(1),
//!     VesselParams::new(1.0, 1.0),
//! )
//! .unwrap();
//!
//! for chamber in chambers.iter_mut() {
//!     chamber.recompute_pressure();
//! }
//! vessel.recompute_flow(&mut chambers, 0.01);
//! assert!(vessel.flow() > 0.0);
//! ```

pub mod chamber;
pub mod error;
pub mod probe;
pub mod vessel;

// Re-exports
pub use chamber::{Chamber, ChamberKind, ChamberParams};
pub use error::{ElementError, ElementResult};
pub use probe::{Probe, flag};
pub use vessel::{Vessel, VesselKind, VesselParams};
