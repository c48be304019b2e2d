use thiserror::Error;

pub type CfResult<T> = Result<T, CfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Value out of range for {what}: {value} (expected {expected})")]
    OutOfRange {
        what: String,
        value: f64,
        expected: &'static str,
    },

    #[error("Resistance of {what} reaches zero for some flow (r={r}, r_k1={k1}, r_k2={k2})")]
    ZeroCrossing { what: String, r: f64, k1: f64, k2: f64 },
}
