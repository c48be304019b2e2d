//! Resolved network state: element registries and name indices.

use std::collections::HashMap;

use cf_core::{ChamberId, ModelId, Real, VesselId};
use cf_elements::{Chamber, Probe, Vessel};
use cf_models::OrganModel;

use crate::error::{EngineError, EngineResult};

/// Which registry a resolved property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Chamber(ChamberId),
    Vessel(VesselId),
    Model(ModelId),
}

/// A `component.field` path resolved against a network.
///
/// Resolving once and reading through the handle avoids the two hash lookups
/// of a path read on every sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub target: Target,
    pub field: String,
}

/// All elements and organ models of one network, addressed by id or by name.
///
/// Chambers are split into time-varying and plain id lists so the engine can
/// run the two pressure phases without re-checking the kind per step.
pub struct Network {
    pub(crate) chambers: Vec<Chamber>,
    pub(crate) chamber_index: HashMap<String, ChamberId>,
    pub(crate) time_varying_ids: Vec<ChamberId>,
    pub(crate) plain_ids: Vec<ChamberId>,
    pub(crate) vessels: Vec<Vessel>,
    pub(crate) vessel_index: HashMap<String, VesselId>,
    /// Registration order is execution order.
    pub(crate) models: Vec<Box<dyn OrganModel>>,
    pub(crate) model_index: HashMap<String, ModelId>,
}

impl Network {
    pub fn chambers(&self) -> &[Chamber] {
        &self.chambers
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn models(&self) -> &[Box<dyn OrganModel>] {
        &self.models
    }

    pub fn chamber_id(&self, name: &str) -> Option<ChamberId> {
        self.chamber_index.get(name).copied()
    }

    pub fn chamber(&self, name: &str) -> Option<&Chamber> {
        self.chamber_id(name).map(|id| &self.chambers[id.index()])
    }

    pub fn chamber_mut(&mut self, name: &str) -> Option<&mut Chamber> {
        let id = self.chamber_id(name)?;
        Some(&mut self.chambers[id.index()])
    }

    pub fn vessel(&self, name: &str) -> Option<&Vessel> {
        let id = self.vessel_index.get(name)?;
        Some(&self.vessels[id.index()])
    }

    pub fn vessel_mut(&mut self, name: &str) -> Option<&mut Vessel> {
        let id = *self.vessel_index.get(name)?;
        Some(&mut self.vessels[id.index()])
    }

    pub fn model(&self, name: &str) -> Option<&dyn OrganModel> {
        let id = self.model_index.get(name)?;
        Some(self.models[id.index()].as_ref())
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut (dyn OrganModel + 'static)> {
        let id = *self.model_index.get(name)?;
        Some(self.models[id.index()].as_mut())
    }

    /// Sum of all chamber volumes.
    pub fn total_volume(&self) -> Real {
        self.chambers.iter().map(Chamber::vol).sum()
    }

    /// Resolve a `component.field` path.
    ///
    /// Component names are looked up in chambers, then vessels, then models.
    /// The field must be one the component reports through [`Probe::fields`].
    pub fn resolve(&self, path: &str) -> EngineResult<PropertyRef> {
        let (component, field) = path
            .split_once('.')
            .filter(|(c, f)| !c.is_empty() && !f.is_empty())
            .ok_or_else(|| EngineError::MalformedPath(path.to_string()))?;

        let (target, fields) = if let Some(id) = self.chamber_index.get(component) {
            (Target::Chamber(*id), self.chambers[id.index()].fields())
        } else if let Some(id) = self.vessel_index.get(component) {
            (Target::Vessel(*id), self.vessels[id.index()].fields())
        } else if let Some(id) = self.model_index.get(component) {
            (Target::Model(*id), self.models[id.index()].fields())
        } else {
            return Err(EngineError::UnknownComponent(component.to_string()));
        };

        if !fields.iter().any(|f| *f == field) {
            return Err(EngineError::UnknownField {
                component: component.to_string(),
                field: field.to_string(),
            });
        }

        Ok(PropertyRef {
            target,
            field: field.to_string(),
        })
    }

    /// Read a previously resolved property.
    pub fn read_property(&self, property: &PropertyRef) -> Option<Real> {
        match property.target {
            Target::Chamber(id) => self.chambers[id.index()].read(&property.field),
            Target::Vessel(id) => self.vessels[id.index()].read(&property.field),
            Target::Model(id) => self.models[id.index()].read(&property.field),
        }
    }

    /// Resolve and read a `component.field` path.
    pub fn read(&self, path: &str) -> EngineResult<Real> {
        let property = self.resolve(path)?;
        self.read_property(&property)
            .ok_or_else(|| EngineError::MalformedPath(path.to_string()))
    }
}
