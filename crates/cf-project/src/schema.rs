//! Definition schema.
//!
//! A definition is a flat list of named elements tagged by `type` and a list
//! of organ models tagged by `subtype`. Unknown tags and unknown fields are
//! rejected at parse time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Definition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Body weight (kg), informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Fixed step size (seconds)
    pub modeling_stepsize: f64,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentDef {
    Compliance(ChamberDef),
    TimeVaryingElastance(ChamberDef),
    Resistor(VesselDef),
    Valve(VesselDef),
}

impl ComponentDef {
    pub fn name(&self) -> &str {
        match self {
            ComponentDef::Compliance(c) | ComponentDef::TimeVaryingElastance(c) => &c.name,
            ComponentDef::Resistor(v) | ComponentDef::Valve(v) => &v.name,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentDef::Compliance(_) => "compliance",
            ComponentDef::TimeVaryingElastance(_) => "time_varying_elastance",
            ComponentDef::Resistor(_) => "resistor",
            ComponentDef::Valve(_) => "valve",
        }
    }

    pub fn is_chamber(&self) -> bool {
        matches!(
            self,
            ComponentDef::Compliance(_) | ComponentDef::TimeVaryingElastance(_)
        )
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChamberDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    pub vol: f64,
    pub u_vol: f64,
    pub el_base: f64,
    #[serde(default)]
    pub el_k: f64,
    #[serde(default)]
    pub pres_outside: f64,
    /// Only for time-varying elastances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub el_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VesselDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    pub comp_from: String,
    pub comp_to: String,
    pub r_for: f64,
    pub r_back: f64,
    #[serde(default)]
    pub r_k1: f64,
    #[serde(default)]
    pub r_k2: f64,
    #[serde(default)]
    pub no_flow: bool,
    #[serde(default)]
    pub no_backflow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ModelDef {
    Ecg(EcgDef),
    Heart(HeartDef),
}

impl ModelDef {
    pub fn name(&self) -> &str {
        match self {
            ModelDef::Ecg(m) => &m.name,
            ModelDef::Heart(m) => &m.name,
        }
    }

    pub fn subtype(&self) -> &'static str {
        match self {
            ModelDef::Ecg(_) => "ecg",
            ModelDef::Heart(_) => "heart",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EcgDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Beats per minute
    pub heart_rate: f64,
    pub pq_time: f64,
    pub qrs_time: f64,
    pub qt_time: f64,
}

fn default_la() -> String {
    "LA".to_string()
}
fn default_ra() -> String {
    "RA".to_string()
}
fn default_lv() -> String {
    "LV".to_string()
}
fn default_rv() -> String {
    "RV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HeartDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Shape coefficient of the activation waveform
    #[serde(alias = "shape_coefficient")]
    pub a: f64,
    #[serde(default = "default_la")]
    pub left_atrium: String,
    #[serde(default = "default_ra")]
    pub right_atrium: String,
    #[serde(default = "default_lv")]
    pub left_ventricle: String,
    #[serde(default = "default_rv")]
    pub right_ventricle: String,
}

impl HeartDef {
    /// Chamber names in (LA, RA, LV, RV) order.
    pub fn chamber_names(&self) -> [&str; 4] {
        [
            self.left_atrium.as_str(),
            self.right_atrium.as_str(),
            self.left_ventricle.as_str(),
            self.right_ventricle.as_str(),
        ]
    }
}
