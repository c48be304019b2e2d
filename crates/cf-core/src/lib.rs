//! cf-core: stable foundation for cardioflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact handles for chambers, vessels and organ models)
//! - error (shared error types)
//! - timing (wall-clock accounting for the step loop)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CfError, CfResult};
pub use ids::*;
pub use numeric::*;
pub use timing::{PerfStats, Timer};
