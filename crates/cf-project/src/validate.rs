//! Definition validation logic.

use crate::schema::{ChamberDef, ComponentDef, Definition, EcgDef, HeartDef, ModelDef, VesselDef};
use cf_core::{
    CfError, ensure_finite, ensure_no_zero_crossing, ensure_non_negative, ensure_positive,
};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} ({reason})")]
    InvalidValue { field: String, reason: String },

    #[error("Model order: {model} must be registered after {requires}")]
    ModelOrder { model: String, requires: String },
}

impl ValidationError {
    fn value(owner: &str, field: &str) -> impl FnOnce(CfError) -> Self {
        let field = format!("{owner}.{field}");
        move |err| ValidationError::InvalidValue {
            field,
            reason: err.to_string(),
        }
    }
}

pub fn validate_definition(definition: &Definition) -> Result<(), ValidationError> {
    ensure_positive(definition.modeling_stepsize, "modeling_stepsize")
        .map_err(ValidationError::value(&definition.name, "modeling_stepsize"))?;
    if let Some(weight) = definition.weight {
        ensure_non_negative(weight, "weight")
            .map_err(ValidationError::value(&definition.name, "weight"))?;
    }

    // Chambers of both kinds share one namespace since vessels may reference either.
    let mut chamber_kinds: HashMap<&str, &'static str> = HashMap::new();
    for component in &definition.components {
        match component {
            ComponentDef::Compliance(c) => validate_chamber(c, false)?,
            ComponentDef::TimeVaryingElastance(c) => validate_chamber(c, true)?,
            ComponentDef::Resistor(_) | ComponentDef::Valve(_) => continue,
        }
        if chamber_kinds
            .insert(component.name(), component.type_name())
            .is_some()
        {
            return Err(ValidationError::DuplicateName {
                name: component.name().to_string(),
                context: "chambers".to_string(),
            });
        }
    }

    let mut vessel_names = HashSet::new();
    for component in &definition.components {
        let vessel = match component {
            ComponentDef::Resistor(v) | ComponentDef::Valve(v) => v,
            _ => continue,
        };
        if !vessel_names.insert(vessel.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: vessel.name.clone(),
                context: "vessels".to_string(),
            });
        }
        validate_vessel(vessel, &chamber_kinds)?;
    }

    let mut model_names = HashSet::new();
    let mut seen_ecg = false;
    for model in &definition.models {
        if !model_names.insert(model.name()) {
            return Err(ValidationError::DuplicateName {
                name: model.name().to_string(),
                context: "models".to_string(),
            });
        }
        match model {
            ModelDef::Ecg(ecg) => {
                validate_ecg(ecg)?;
                seen_ecg = true;
            }
            ModelDef::Heart(heart) => {
                if !seen_ecg {
                    return Err(ValidationError::ModelOrder {
                        model: heart.name.clone(),
                        requires: "an ecg model".to_string(),
                    });
                }
                validate_heart(heart, &chamber_kinds)?;
            }
        }
    }

    Ok(())
}

fn validate_chamber(chamber: &ChamberDef, time_varying: bool) -> Result<(), ValidationError> {
    let name = chamber.name.as_str();
    ensure_non_negative(chamber.vol, "vol").map_err(ValidationError::value(name, "vol"))?;
    ensure_non_negative(chamber.u_vol, "u_vol").map_err(ValidationError::value(name, "u_vol"))?;
    ensure_finite(chamber.el_base, "el_base").map_err(ValidationError::value(name, "el_base"))?;
    ensure_finite(chamber.el_k, "el_k").map_err(ValidationError::value(name, "el_k"))?;
    ensure_finite(chamber.pres_outside, "pres_outside")
        .map_err(ValidationError::value(name, "pres_outside"))?;

    match (time_varying, chamber.el_multiplier) {
        (true, Some(m)) => {
            ensure_finite(m, "el_multiplier")
                .map_err(ValidationError::value(name, "el_multiplier"))?;
            if m < 1.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{name}.el_multiplier"),
                    reason: format!("{m} must be >= 1"),
                });
            }
        }
        (true, None) => {
            return Err(ValidationError::InvalidValue {
                field: format!("{name}.el_multiplier"),
                reason: "required for time_varying_elastance".to_string(),
            });
        }
        (false, Some(_)) => {
            return Err(ValidationError::InvalidValue {
                field: format!("{name}.el_multiplier"),
                reason: "only allowed on time_varying_elastance".to_string(),
            });
        }
        (false, None) => {}
    }
    Ok(())
}

fn validate_vessel(
    vessel: &VesselDef,
    chambers: &HashMap<&str, &'static str>,
) -> Result<(), ValidationError> {
    let name = vessel.name.as_str();
    for (endpoint, field) in [(&vessel.comp_from, "comp_from"), (&vessel.comp_to, "comp_to")] {
        if !chambers.contains_key(endpoint.as_str()) {
            return Err(ValidationError::MissingReference {
                name: endpoint.clone(),
                context: format!("vessel '{name}' {field}"),
            });
        }
    }
    ensure_positive(vessel.r_for, "r_for").map_err(ValidationError::value(name, "r_for"))?;
    ensure_positive(vessel.r_back, "r_back").map_err(ValidationError::value(name, "r_back"))?;
    ensure_non_negative(vessel.r_k1, "r_k1").map_err(ValidationError::value(name, "r_k1"))?;
    ensure_non_negative(vessel.r_k2, "r_k2").map_err(ValidationError::value(name, "r_k2"))?;
    ensure_no_zero_crossing(
        vessel.r_for.min(vessel.r_back),
        vessel.r_k1,
        vessel.r_k2,
        "r_k1",
    )
    .map_err(ValidationError::value(name, "r_k1"))?;
    Ok(())
}

fn validate_ecg(ecg: &EcgDef) -> Result<(), ValidationError> {
    let name = ecg.name.as_str();
    ensure_non_negative(ecg.heart_rate, "heart_rate")
        .map_err(ValidationError::value(name, "heart_rate"))?;
    ensure_positive(ecg.pq_time, "pq_time").map_err(ValidationError::value(name, "pq_time"))?;
    ensure_positive(ecg.qrs_time, "qrs_time").map_err(ValidationError::value(name, "qrs_time"))?;
    ensure_positive(ecg.qt_time, "qt_time").map_err(ValidationError::value(name, "qt_time"))?;
    Ok(())
}

fn validate_heart(
    heart: &HeartDef,
    chambers: &HashMap<&str, &'static str>,
) -> Result<(), ValidationError> {
    ensure_positive(heart.a, "a").map_err(ValidationError::value(&heart.name, "a"))?;
    for chamber in heart.chamber_names() {
        match chambers.get(chamber) {
            Some(&"time_varying_elastance") => {}
            Some(_) => {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.{chamber}", heart.name),
                    reason: "heart chambers must be time_varying_elastance".to_string(),
                });
            }
            None => {
                return Err(ValidationError::MissingReference {
                    name: chamber.to_string(),
                    context: format!("heart model '{}'", heart.name),
                });
            }
        }
    }
    Ok(())
}
