//! Volume reservoir with non-linear elastance.

use cf_core::{Real, ensure_finite, ensure_non_negative};

use crate::error::{ElementError, ElementResult};
use crate::probe::{Probe, flag};

/// Flavour of a chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChamberKind {
    /// Passive compliance (vessels, lungs, venous pools).
    Compliance,
    /// Heart chamber whose elastance is modulated by an activation factor.
    TimeVaryingElastance,
}

/// Independent parameters of a chamber.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamberParams {
    /// Initial stored volume
    pub vol: Real,
    /// Unstressed volume: no recoil pressure below this volume
    pub u_vol: Real,
    /// Base elastance
    pub el_base: Real,
    /// Non-linear elastance coefficient (scales excess volume squared)
    pub el_k: Real,
    /// Externally imposed outside pressure
    pub pres_outside: Real,
    pub is_enabled: bool,
}

impl ChamberParams {
    /// Linear, enabled chamber with zero outside pressure.
    pub fn new(vol: Real, u_vol: Real, el_base: Real) -> Self {
        Self {
            vol,
            u_vol,
            el_base,
            el_k: 0.0,
            pres_outside: 0.0,
            is_enabled: true,
        }
    }

    pub fn with_el_k(mut self, el_k: Real) -> Self {
        self.el_k = el_k;
        self
    }

    pub fn with_pres_outside(mut self, pres_outside: Real) -> Self {
        self.pres_outside = pres_outside;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

/// A pressure/volume element of the network.
///
/// Pressure is recomputed from the current volume every step and never
/// integrated. Volume only changes through [`Chamber::receive_volume`] and
/// [`Chamber::remove_volume`], which keep it non-negative.
#[derive(Debug, Clone)]
pub struct Chamber {
    name: String,
    kind: ChamberKind,
    pub is_enabled: bool,
    vol: Real,
    pub u_vol: Real,
    pub el_base: Real,
    pub el_k: Real,
    /// Elastance multiplier at full activation (1.0 for plain compliances)
    pub el_multiplier: Real,
    /// Written by the cardiac driver each step; 0.0 for plain compliances
    pub activation_factor: Real,
    pub pres_outside: Real,
    pres: Real,
    recoil_pressure: Real,
}

impl Chamber {
    /// Create a passive compliance.
    pub fn compliance(name: impl Into<String>, params: ChamberParams) -> ElementResult<Self> {
        Self::build(name.into(), ChamberKind::Compliance, params, 1.0)
    }

    /// Create a time-varying elastance chamber.
    ///
    /// `el_multiplier` is the elastance ratio reached at activation factor 1.
    pub fn time_varying(
        name: impl Into<String>,
        params: ChamberParams,
        el_multiplier: Real,
    ) -> ElementResult<Self> {
        Self::build(
            name.into(),
            ChamberKind::TimeVaryingElastance,
            params,
            el_multiplier,
        )
    }

    fn build(
        name: String,
        kind: ChamberKind,
        params: ChamberParams,
        el_multiplier: Real,
    ) -> ElementResult<Self> {
        let vol = ensure_non_negative(params.vol, "vol").map_err(ElementError::param(&name, "vol"))?;
        let u_vol =
            ensure_non_negative(params.u_vol, "u_vol").map_err(ElementError::param(&name, "u_vol"))?;
        let el_base =
            ensure_finite(params.el_base, "el_base").map_err(ElementError::param(&name, "el_base"))?;
        let el_k = ensure_finite(params.el_k, "el_k").map_err(ElementError::param(&name, "el_k"))?;
        let pres_outside = ensure_finite(params.pres_outside, "pres_outside")
            .map_err(ElementError::param(&name, "pres_outside"))?;
        let el_multiplier = ensure_finite(el_multiplier, "el_multiplier")
            .map_err(ElementError::param(&name, "el_multiplier"))?;
        if el_multiplier < 1.0 {
            return Err(ElementError::InvalidParameter {
                element: name,
                field: "el_multiplier",
                source: cf_core::CfError::OutOfRange {
                    what: "el_multiplier".into(),
                    value: el_multiplier,
                    expected: ">= 1",
                },
            });
        }

        Ok(Self {
            name,
            kind,
            is_enabled: params.is_enabled,
            vol,
            u_vol,
            el_base,
            el_k,
            el_multiplier,
            activation_factor: 0.0,
            pres_outside,
            pres: 0.0,
            recoil_pressure: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChamberKind {
        self.kind
    }

    pub fn is_time_varying(&self) -> bool {
        self.kind == ChamberKind::TimeVaryingElastance
    }

    pub fn vol(&self) -> Real {
        self.vol
    }

    /// Transmural pressure as of the last `recompute_pressure`.
    pub fn pres(&self) -> Real {
        self.pres
    }

    pub fn recoil_pressure(&self) -> Real {
        self.recoil_pressure
    }

    /// Elastance at the current volume and activation.
    pub fn elastance(&self) -> Real {
        let excess = self.vol - self.u_vol;
        let passive = self.el_base + self.el_k * excess * excess;
        match self.kind {
            ChamberKind::Compliance => passive,
            ChamberKind::TimeVaryingElastance => {
                passive * (1.0 + (self.el_multiplier - 1.0) * self.activation_factor)
            }
        }
    }

    /// Recompute recoil and transmural pressure from the current volume.
    pub fn recompute_pressure(&mut self) {
        if !self.is_enabled {
            return;
        }
        let excess = self.vol - self.u_vol;
        self.recoil_pressure = excess * self.elastance();
        self.pres = self.recoil_pressure + self.pres_outside;
    }

    /// Add `amount` to the stored volume.
    ///
    /// Returns the volume that could not be taken up: the whole amount when
    /// the chamber is disabled, otherwise the mass-balance shortfall.
    pub fn receive_volume(&mut self, amount: Real) -> Real {
        if !self.is_enabled {
            return amount;
        }
        self.vol += amount;
        self.protect_mass_balance()
    }

    /// Remove `amount` from the stored volume.
    ///
    /// Returns the volume that could not be removed. When the chamber holds
    /// less than `amount`, its volume is clamped to zero and the deficit is
    /// returned. A disabled chamber gives nothing and returns `amount`.
    pub fn remove_volume(&mut self, amount: Real) -> Real {
        if !self.is_enabled {
            return amount;
        }
        self.vol -= amount;
        self.protect_mass_balance()
    }

    fn protect_mass_balance(&mut self) -> Real {
        if self.vol < 0.0 {
            let shortfall = -self.vol;
            self.vol = 0.0;
            shortfall
        } else {
            0.0
        }
    }
}

const CHAMBER_FIELDS: &[&str] = &[
    "vol",
    "u_vol",
    "el_base",
    "el_k",
    "el_multiplier",
    "activation_factor",
    "pres",
    "recoil_pressure",
    "pres_outside",
    "elastance",
    "is_enabled",
];

impl Probe for Chamber {
    fn fields(&self) -> &'static [&'static str] {
        CHAMBER_FIELDS
    }

    fn read(&self, field: &str) -> Option<Real> {
        let value = match field {
            "vol" => self.vol,
            "u_vol" => self.u_vol,
            "el_base" => self.el_base,
            "el_k" => self.el_k,
            "el_multiplier" => self.el_multiplier,
            "activation_factor" => self.activation_factor,
            "pres" => self.pres,
            "recoil_pressure" => self.recoil_pressure,
            "pres_outside" => self.pres_outside,
            "elastance" => self.elastance(),
            "is_enabled" => flag(self.is_enabled),
            _ => return None,
        };
        Some(value)
    }
}
