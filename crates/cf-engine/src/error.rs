//! Error types for network construction and engine control.

use cf_elements::ElementError;
use cf_models::ModelError;
use cf_project::{ProjectError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: &'static str },

    #[error("{owner} references unknown chamber '{chamber}'")]
    UnresolvedChamber { owner: String, chamber: String },

    #[error("Model '{model}' must be registered after a '{requires}' model")]
    ModelOrder {
        model: String,
        requires: &'static str,
    },

    #[error("Model '{model}' drives chamber '{chamber}', which is not a time-varying elastance")]
    NotTimeVarying { model: String, chamber: String },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component '{component}' has no field '{field}'")]
    UnknownField { component: String, field: String },

    #[error("Malformed property path '{0}' (expected component.field)")]
    MalformedPath(String),

    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Definition error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Project error: {0}")]
    Project(#[from] ProjectError),
}

pub type EngineResult<T> = Result<T, EngineError>;
