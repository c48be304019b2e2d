//! Error types for element construction.

use cf_core::CfError;
use thiserror::Error;

/// Errors raised while building an element from its parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("Invalid parameter '{field}' on element '{element}': {source}")]
    InvalidParameter {
        element: String,
        field: &'static str,
        source: CfError,
    },
}

pub type ElementResult<T> = Result<T, ElementError>;

impl ElementError {
    pub(crate) fn param<'a>(
        element: &'a str,
        field: &'static str,
    ) -> impl FnOnce(CfError) -> Self + 'a {
        move |source| ElementError::InvalidParameter {
            element: element.to_string(),
            field,
            source,
        }
    }
}
