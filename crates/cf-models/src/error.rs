//! Error types for organ model construction.

use cf_core::CfError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid parameter '{field}' on model '{model}': {source}")]
    InvalidParameter {
        model: String,
        field: &'static str,
        source: CfError,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub(crate) fn param<'a>(
        model: &'a str,
        field: &'static str,
    ) -> impl FnOnce(CfError) -> Self + 'a {
        move |source| ModelError::InvalidParameter {
            model: model.to_string(),
            field,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_wraps_core_error_with_model_and_field() {
        let name = String::from("ecg");
        let err = cf_core::ensure_positive(0.0, "qt_time")
            .map_err(ModelError::param(&name, "qt_time"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidParameter {
                model: "ecg".into(),
                field: "qt_time",
                source: CfError::OutOfRange {
                    what: "qt_time".into(),
                    value: 0.0,
                    expected: "> 0",
                },
            }
        );
    }
}
