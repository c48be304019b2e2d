//! cf-project: declarative model definition format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_definition};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported definition format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Definition> {
    let definition: Definition = serde_yaml::from_str(content)?;
    validate_definition(&definition)?;
    Ok(definition)
}

pub fn from_json_str(content: &str) -> ProjectResult<Definition> {
    let definition: Definition = serde_json::from_str(content)?;
    validate_definition(&definition)?;
    Ok(definition)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Definition> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Definition> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Load a definition, picking the parser from the file extension.
pub fn load(path: &std::path::Path) -> ProjectResult<Definition> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        other => Err(ProjectError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
