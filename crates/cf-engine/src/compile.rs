//! Compilation of a definition into a runnable engine.

use std::path::Path;

use cf_elements::{ChamberParams, VesselKind, VesselParams};
use cf_models::{CardiacDriver, ConductionParams, ConductionSystem, HeartChambers, OrganModel};
use cf_project::{ChamberDef, ComponentDef, Definition, HeartDef, ModelDef, VesselDef};

use crate::builder::NetworkBuilder;
use crate::engine::NetworkEngine;
use crate::error::{EngineError, EngineResult};

/// Validate `definition` and build its engine.
///
/// Chambers are registered first, in definition order, then vessels, then
/// models in definition order (which becomes their step order).
pub fn compile(definition: &Definition) -> EngineResult<NetworkEngine> {
    cf_project::validate_definition(definition)?;

    let mut builder = NetworkBuilder::new(definition.modeling_stepsize).with_metadata(
        definition.name.clone(),
        definition.description.clone(),
        definition.weight,
    );

    for component in &definition.components {
        match component {
            ComponentDef::Compliance(c) => {
                builder.add_compliance(&c.name, chamber_params(c))?;
            }
            ComponentDef::TimeVaryingElastance(c) => {
                builder.add_time_varying(&c.name, chamber_params(c), c.el_multiplier.unwrap_or(1.0))?;
            }
            ComponentDef::Resistor(_) | ComponentDef::Valve(_) => {}
        }
    }

    for component in &definition.components {
        match component {
            ComponentDef::Resistor(v) => add_vessel(&mut builder, VesselKind::Resistor, v),
            ComponentDef::Valve(v) => add_vessel(&mut builder, VesselKind::Valve, v),
            ComponentDef::Compliance(_) | ComponentDef::TimeVaryingElastance(_) => {}
        }
    }

    for model in &definition.models {
        let compiled: Box<dyn OrganModel> = match model {
            ModelDef::Ecg(ecg) => Box::new(ConductionSystem::new(
                &ecg.name,
                ConductionParams {
                    heart_rate: ecg.heart_rate,
                    pq_time: ecg.pq_time,
                    qrs_time: ecg.qrs_time,
                    qt_time: ecg.qt_time,
                    is_enabled: ecg.is_enabled,
                },
            )?),
            ModelDef::Heart(heart) => Box::new(heart_driver(&builder, heart)?),
        };
        builder.add_model(compiled);
    }

    builder.build()
}

/// Load, validate and compile a YAML or JSON definition file.
pub fn load_engine(path: &Path) -> EngineResult<NetworkEngine> {
    let definition = cf_project::load(path)?;
    compile(&definition)
}

fn chamber_params(def: &ChamberDef) -> ChamberParams {
    let mut params = ChamberParams::new(def.vol, def.u_vol, def.el_base)
        .with_el_k(def.el_k)
        .with_pres_outside(def.pres_outside);
    params.is_enabled = def.is_enabled;
    params
}

fn add_vessel(builder: &mut NetworkBuilder, kind: VesselKind, def: &VesselDef) {
    let params = VesselParams {
        r_for: def.r_for,
        r_back: def.r_back,
        r_k1: def.r_k1,
        r_k2: def.r_k2,
        no_flow: def.no_flow,
        no_backflow: def.no_backflow,
        is_enabled: def.is_enabled,
    };
    builder.add_vessel(&def.name, kind, &def.comp_from, &def.comp_to, params);
}

fn heart_driver(builder: &NetworkBuilder, def: &HeartDef) -> EngineResult<CardiacDriver> {
    let [la, ra, lv, rv] = def.chamber_names().map(|chamber| {
        builder
            .chamber_id(chamber)
            .ok_or_else(|| EngineError::UnresolvedChamber {
                owner: def.name.clone(),
                chamber: chamber.to_string(),
            })
    });
    let chambers = HeartChambers {
        left_atrium: la?,
        right_atrium: ra?,
        left_ventricle: lv?,
        right_ventricle: rv?,
    };
    let mut driver = CardiacDriver::new(&def.name, def.a, chambers)?;
    driver.is_enabled = def.is_enabled;
    Ok(driver)
}
