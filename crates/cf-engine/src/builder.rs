//! Incremental network builder.

use std::collections::HashMap;

use cf_core::{ChamberId, ModelId, Real, VesselId, ensure_positive};
use cf_elements::{Chamber, ChamberParams, Vessel, VesselKind, VesselParams};
use cf_models::OrganModel;
use tracing::{debug, warn};

use crate::engine::NetworkEngine;
use crate::error::{EngineError, EngineResult};
use crate::network::Network;

/// A vessel whose endpoints are still names.
#[derive(Debug)]
struct PendingVessel {
    name: String,
    kind: VesselKind,
    from: String,
    to: String,
    params: VesselParams,
}

/// Builder for constructing a network incrementally.
///
/// Chambers are registered immediately so organ models can be given their
/// ids. Vessels are kept by endpoint name and resolved in [`build`], which
/// fails on the first name that does not match a chamber.
///
/// [`build`]: NetworkBuilder::build
pub struct NetworkBuilder {
    dt: Real,
    name: String,
    description: String,
    weight: Option<Real>,
    chambers: Vec<Chamber>,
    chamber_index: HashMap<String, ChamberId>,
    vessels: Vec<PendingVessel>,
    models: Vec<Box<dyn OrganModel>>,
}

impl NetworkBuilder {
    /// Create an empty builder stepping with `dt` seconds.
    pub fn new(dt: Real) -> Self {
        Self {
            dt,
            name: String::new(),
            description: String::new(),
            weight: None,
            chambers: Vec::new(),
            chamber_index: HashMap::new(),
            vessels: Vec::new(),
            models: Vec::new(),
        }
    }

    /// Attach the descriptive metadata reported by the engine.
    pub fn with_metadata(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        weight: Option<Real>,
    ) -> Self {
        self.name = name.into();
        self.description = description.into();
        self.weight = weight;
        self
    }

    /// Register a passive compliance and return its id.
    pub fn add_compliance(
        &mut self,
        name: impl Into<String>,
        params: ChamberParams,
    ) -> EngineResult<ChamberId> {
        let chamber = Chamber::compliance(name, params)?;
        self.push_chamber(chamber)
    }

    /// Register a time-varying elastance chamber and return its id.
    pub fn add_time_varying(
        &mut self,
        name: impl Into<String>,
        params: ChamberParams,
        el_multiplier: Real,
    ) -> EngineResult<ChamberId> {
        let chamber = Chamber::time_varying(name, params, el_multiplier)?;
        self.push_chamber(chamber)
    }

    fn push_chamber(&mut self, chamber: Chamber) -> EngineResult<ChamberId> {
        if self.chamber_index.contains_key(chamber.name()) {
            return Err(EngineError::DuplicateName {
                name: chamber.name().to_string(),
                context: "chambers",
            });
        }
        let id = ChamberId::from_index(self.chambers.len());
        debug!(chamber = chamber.name(), kind = ?chamber.kind(), %id, "registered chamber");
        self.chamber_index.insert(chamber.name().to_string(), id);
        self.chambers.push(chamber);
        Ok(id)
    }

    /// Id of an already registered chamber.
    pub fn chamber_id(&self, name: &str) -> Option<ChamberId> {
        self.chamber_index.get(name).copied()
    }

    /// Queue a vessel between two chambers given by name.
    pub fn add_vessel(
        &mut self,
        name: impl Into<String>,
        kind: VesselKind,
        from: impl Into<String>,
        to: impl Into<String>,
        params: VesselParams,
    ) -> &mut Self {
        self.vessels.push(PendingVessel {
            name: name.into(),
            kind,
            from: from.into(),
            to: to.into(),
            params,
        });
        self
    }

    /// Append an organ model. Models step in the order they are added.
    pub fn add_model(&mut self, model: Box<dyn OrganModel>) -> &mut Self {
        self.models.push(model);
        self
    }

    /// Resolve every reference and freeze the network into an engine.
    pub fn build(self) -> EngineResult<NetworkEngine> {
        let dt = ensure_positive(self.dt, "modeling_stepsize").map_err(|e| {
            EngineError::InvalidArg {
                what: e.to_string(),
            }
        })?;

        let mut vessels = Vec::with_capacity(self.vessels.len());
        let mut vessel_index = HashMap::new();
        for pending in self.vessels {
            let from = resolve_endpoint(&self.chamber_index, &pending.name, &pending.from)?;
            let to = resolve_endpoint(&self.chamber_index, &pending.name, &pending.to)?;
            if from == to {
                warn!(
                    vessel = %pending.name,
                    chamber = %pending.from,
                    "vessel connects a chamber to itself"
                );
            }
            let id = VesselId::from_index(vessels.len());
            if vessel_index.insert(pending.name.clone(), id).is_some() {
                return Err(EngineError::DuplicateName {
                    name: pending.name,
                    context: "vessels",
                });
            }
            debug!(
                vessel = %pending.name,
                from = %pending.from,
                to = %pending.to,
                "resolved vessel endpoints"
            );
            vessels.push(Vessel::new(
                pending.name,
                pending.kind,
                from,
                to,
                pending.params,
            )?);
        }

        let mut model_index = HashMap::new();
        for (index, model) in self.models.iter().enumerate() {
            if model_index
                .insert(model.name().to_string(), ModelId::from_index(index))
                .is_some()
            {
                return Err(EngineError::DuplicateName {
                    name: model.name().to_string(),
                    context: "models",
                });
            }
            for &requires in model.requires() {
                if !self.models[..index].iter().any(|m| m.kind() == requires) {
                    return Err(EngineError::ModelOrder {
                        model: model.name().to_string(),
                        requires,
                    });
                }
            }
            for id in model.driven_chambers() {
                match self.chambers.get(id.index()) {
                    Some(chamber) if chamber.is_time_varying() => {}
                    Some(chamber) => {
                        return Err(EngineError::NotTimeVarying {
                            model: model.name().to_string(),
                            chamber: chamber.name().to_string(),
                        });
                    }
                    None => {
                        return Err(EngineError::UnresolvedChamber {
                            owner: model.name().to_string(),
                            chamber: format!("#{id}"),
                        });
                    }
                }
            }
            debug!(model = model.name(), kind = model.kind(), order = index, "registered model");
        }

        let (time_varying_ids, plain_ids) = self
            .chambers
            .iter()
            .enumerate()
            .map(|(i, c)| (ChamberId::from_index(i), c.is_time_varying()))
            .fold((Vec::new(), Vec::new()), |(mut tv, mut plain), (id, is_tv)| {
                if is_tv {
                    tv.push(id);
                } else {
                    plain.push(id);
                }
                (tv, plain)
            });

        let network = Network {
            chambers: self.chambers,
            chamber_index: self.chamber_index,
            time_varying_ids,
            plain_ids,
            vessels,
            vessel_index,
            models: self.models,
            model_index,
        };

        Ok(NetworkEngine::new(
            network,
            dt,
            self.name,
            self.description,
            self.weight,
        ))
    }
}

fn resolve_endpoint(
    index: &HashMap<String, ChamberId>,
    vessel: &str,
    chamber: &str,
) -> EngineResult<ChamberId> {
    index
        .get(chamber)
        .copied()
        .ok_or_else(|| EngineError::UnresolvedChamber {
            owner: vessel.to_string(),
            chamber: chamber.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_models::{CardiacDriver, ConductionParams, ConductionSystem, HeartChambers};

    fn two_chambers() -> NetworkBuilder {
        let mut builder = NetworkBuilder::new(0.01);
        builder
            .add_compliance("A", ChamberParams::new(100.0, 50.0, 1.0))
            .unwrap();
        builder
            .add_compliance("B", ChamberParams::new(0.0, 0.0, 1.0))
            .unwrap();
        builder
    }

    #[test]
    fn duplicate_chamber_is_rejected_immediately() {
        let mut builder = two_chambers();
        let err = builder
            .add_time_varying("A", ChamberParams::new(1.0, 0.0, 1.0), 2.0)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DuplicateName { context: "chambers", .. }
        ));
    }

    #[test]
    fn unresolved_endpoint_fails_build() {
        let mut builder = two_chambers();
        builder.add_vessel("A_C", VesselKind::Resistor, "A", "C", VesselParams::new(1.0, 1.0));
        match builder.build() {
            Err(EngineError::UnresolvedChamber { owner, chamber }) => {
                assert_eq!(owner, "A_C");
                assert_eq!(chamber, "C");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("build should fail"),
        }
    }

    #[test]
    fn duplicate_vessel_fails_build() {
        let mut builder = two_chambers();
        builder
            .add_vessel("A_B", VesselKind::Resistor, "A", "B", VesselParams::new(1.0, 1.0))
            .add_vessel("A_B", VesselKind::Valve, "B", "A", VesselParams::new(1.0, 1.0));
        assert!(matches!(
            builder.build(),
            Err(EngineError::DuplicateName { context: "vessels", .. })
        ));
    }

    #[test]
    fn invalid_vessel_parameters_surface_as_element_errors() {
        let mut builder = two_chambers();
        builder.add_vessel("A_B", VesselKind::Resistor, "A", "B", VesselParams::new(0.0, 1.0));
        assert!(matches!(builder.build(), Err(EngineError::Element(_))));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let builder = NetworkBuilder::new(0.0);
        assert!(matches!(builder.build(), Err(EngineError::InvalidArg { .. })));
    }

    fn heart_builder() -> (NetworkBuilder, HeartChambers) {
        let mut builder = NetworkBuilder::new(0.001);
        let mut id = |name: &str| {
            builder
                .add_time_varying(name, ChamberParams::new(100.0, 50.0, 0.1), 10.0)
                .unwrap()
        };
        let chambers = HeartChambers {
            left_atrium: id("LA"),
            right_atrium: id("RA"),
            left_ventricle: id("LV"),
            right_ventricle: id("RV"),
        };
        (builder, chambers)
    }

    fn ecg() -> Box<dyn OrganModel> {
        Box::new(ConductionSystem::new("ecg", ConductionParams::default()).unwrap())
    }

    fn heart(chambers: HeartChambers) -> Box<dyn OrganModel> {
        Box::new(CardiacDriver::new("heart", 1.5, chambers).unwrap())
    }

    #[test]
    fn heart_after_ecg_builds() {
        let (mut builder, chambers) = heart_builder();
        builder.add_model(ecg()).add_model(heart(chambers));
        let engine = builder.build().unwrap();
        assert_eq!(engine.network().models().len(), 2);
    }

    #[test]
    fn heart_before_ecg_is_rejected() {
        let (mut builder, chambers) = heart_builder();
        builder.add_model(heart(chambers)).add_model(ecg());
        match builder.build() {
            Err(EngineError::ModelOrder { model, requires }) => {
                assert_eq!(model, "heart");
                assert_eq!(requires, "ecg");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("build should fail"),
        }
    }

    #[test]
    fn heart_driving_a_plain_compliance_is_rejected() {
        let (mut builder, mut chambers) = heart_builder();
        chambers.left_ventricle = builder
            .add_compliance("SA", ChamberParams::new(700.0, 600.0, 0.8))
            .unwrap();
        builder.add_model(ecg()).add_model(heart(chambers));
        match builder.build() {
            Err(EngineError::NotTimeVarying { model, chamber }) => {
                assert_eq!(model, "heart");
                assert_eq!(chamber, "SA");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("build should fail"),
        }
    }

    #[test]
    fn chambers_are_split_by_kind() {
        let mut builder = two_chambers();
        let lv = builder
            .add_time_varying("LV", ChamberParams::new(120.0, 60.0, 0.1), 20.0)
            .unwrap();
        assert_eq!(builder.chamber_id("LV"), Some(lv));
        let engine = builder.build().unwrap();
        let network = engine.network();
        assert_eq!(network.time_varying_ids, vec![lv]);
        assert_eq!(network.plain_ids.len(), 2);
    }
}
