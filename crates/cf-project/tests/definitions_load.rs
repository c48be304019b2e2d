//! Integration test: loading definition files from disk and from strings.

use cf_project::{ComponentDef, ModelDef, ProjectError, ValidationError, from_json_str, from_yaml_str, load};
use std::path::PathBuf;

fn definitions_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("definitions")
}

#[test]
fn baseline_definition_loads_and_validates() {
    let def = load(&definitions_dir().join("baseline.yaml")).unwrap();
    assert_eq!(def.name, "baseline_adult");
    assert_eq!(def.modeling_stepsize, 0.0005);

    let chambers = def.components.iter().filter(|c| c.is_chamber()).count();
    assert_eq!(chambers, 8);
    let valves = def
        .components
        .iter()
        .filter(|c| matches!(c, ComponentDef::Valve(v) if v.no_backflow))
        .count();
    assert_eq!(valves, 4);

    let subtypes: Vec<&str> = def.models.iter().map(ModelDef::subtype).collect();
    assert_eq!(subtypes, ["ecg", "heart"]);
}

#[test]
fn json_definition_loads() {
    let json = r#"{
        "name": "pair",
        "modeling_stepsize": 0.01,
        "components": [
            {"type": "compliance", "name": "A", "vol": 100, "u_vol": 50, "el_base": 1},
            {"type": "compliance", "name": "B", "vol": 0, "u_vol": 0, "el_base": 1},
            {"type": "resistor", "name": "A_B", "comp_from": "A", "comp_to": "B", "r_for": 1, "r_back": 1}
        ]
    }"#;
    let def = from_json_str(json).unwrap();
    assert_eq!(def.components.len(), 3);
    assert!(def.models.is_empty());
}

#[test]
fn unresolved_vessel_endpoint_is_a_validation_error() {
    let yaml = r#"
name: broken
modeling_stepsize: 0.01
components:
  - type: compliance
    name: A
    vol: 1.0
    u_vol: 0.0
    el_base: 1.0
  - type: valve
    name: A_B
    comp_from: A
    comp_to: B
    r_for: 1.0
    r_back: 1.0
"#;
    let err = from_yaml_str(yaml).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn zero_shape_coefficient_is_rejected() {
    let yaml = r#"
name: heart_only
modeling_stepsize: 0.001
models:
  - subtype: ecg
    name: ecg
    heart_rate: 60.0
    pq_time: 0.16
    qrs_time: 0.1
    qt_time: 0.35
  - subtype: heart
    name: heart
    a: 0.0
"#;
    let err = from_yaml_str(yaml).unwrap_err();
    assert!(err.to_string().contains("heart.a"), "{err}");
}

#[test]
fn unknown_model_subtype_is_a_parse_error() {
    let yaml = "name: x\nmodeling_stepsize: 0.01\nmodels:\n  - subtype: lungs\n    name: lungs\n";
    assert!(matches!(from_yaml_str(yaml), Err(ProjectError::Yaml(_))));
}

#[test]
fn unknown_extension_is_rejected() {
    let err = load(&definitions_dir().join("baseline.toml")).unwrap_err();
    assert!(matches!(err, ProjectError::UnsupportedFormat(_)));
}
