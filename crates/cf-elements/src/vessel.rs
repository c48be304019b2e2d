//! Flow-restricting connector between two chambers.

use cf_core::{ChamberId, Real, ensure_no_zero_crossing, ensure_non_negative, ensure_positive};

use crate::chamber::Chamber;
use crate::error::{ElementError, ElementResult};
use crate::probe::{Probe, flag};

/// Flavour of a vessel. Both share the same flow law; valves are the
/// elements that usually carry `no_backflow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselKind {
    Resistor,
    Valve,
}

/// Independent parameters of a vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselParams {
    /// Linear resistance when the "from" pressure exceeds the "to" pressure
    pub r_for: Real,
    /// Linear resistance otherwise
    pub r_back: Real,
    /// Flow-dependent resistance coefficient
    pub r_k1: Real,
    /// Flow²-dependent resistance coefficient
    pub r_k2: Real,
    pub no_flow: bool,
    pub no_backflow: bool,
    pub is_enabled: bool,
}

impl VesselParams {
    /// Linear, enabled vessel that allows backflow.
    pub fn new(r_for: Real, r_back: Real) -> Self {
        Self {
            r_for,
            r_back,
            r_k1: 0.0,
            r_k2: 0.0,
            no_flow: false,
            no_backflow: false,
            is_enabled: true,
        }
    }

    pub fn with_nonlinear(mut self, r_k1: Real, r_k2: Real) -> Self {
        self.r_k1 = r_k1;
        self.r_k2 = r_k2;
        self
    }

    pub fn no_backflow(mut self) -> Self {
        self.no_backflow = true;
        self
    }

    pub fn no_flow(mut self) -> Self {
        self.no_flow = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

/// Resistor or valve joining a "from" chamber to a "to" chamber.
///
/// Positive flow moves volume from → to. The non-linear resistance terms use
/// the flow of the previous evaluation, so resistance lags flow by one step.
#[derive(Debug, Clone)]
pub struct Vessel {
    name: String,
    kind: VesselKind,
    from: ChamberId,
    to: ChamberId,
    pub is_enabled: bool,
    pub no_flow: bool,
    pub no_backflow: bool,
    pub r_for: Real,
    pub r_back: Real,
    pub r_k1: Real,
    pub r_k2: Real,
    flow: Real,
    resistance: Real,
    shortfall: Real,
}

impl Vessel {
    /// Create a vessel bound to two already-resolved chambers.
    pub fn new(
        name: impl Into<String>,
        kind: VesselKind,
        from: ChamberId,
        to: ChamberId,
        params: VesselParams,
    ) -> ElementResult<Self> {
        let name = name.into();
        let r_for =
            ensure_positive(params.r_for, "r_for").map_err(ElementError::param(&name, "r_for"))?;
        let r_back = ensure_positive(params.r_back, "r_back")
            .map_err(ElementError::param(&name, "r_back"))?;
        let r_k1 =
            ensure_non_negative(params.r_k1, "r_k1").map_err(ElementError::param(&name, "r_k1"))?;
        let r_k2 =
            ensure_non_negative(params.r_k2, "r_k2").map_err(ElementError::param(&name, "r_k2"))?;
        ensure_no_zero_crossing(r_for.min(r_back), r_k1, r_k2, "r_k1")
            .map_err(ElementError::param(&name, "r_k1"))?;

        Ok(Self {
            name,
            kind,
            from,
            to,
            is_enabled: params.is_enabled,
            no_flow: params.no_flow,
            no_backflow: params.no_backflow,
            r_for,
            r_back,
            r_k1,
            r_k2,
            flow: 0.0,
            resistance: 0.0,
            shortfall: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VesselKind {
        self.kind
    }

    pub fn from(&self) -> ChamberId {
        self.from
    }

    pub fn to(&self) -> ChamberId {
        self.to
    }

    /// Flow of the last evaluation (volume per second, from → to positive).
    pub fn flow(&self) -> Real {
        self.flow
    }

    pub fn resistance(&self) -> Real {
        self.resistance
    }

    /// Volume the giving chamber could not supply during the last step.
    pub fn shortfall(&self) -> Real {
        self.shortfall
    }

    /// Resistance for the given pressure ordering, using the current (previous step's) flow.
    pub fn resistance_for(&self, p1: Real, p2: Real) -> Real {
        let nonlin = self.r_k1 * self.flow + self.r_k2 * self.flow * self.flow;
        if p1 > p2 {
            self.r_for + nonlin
        } else {
            self.r_back + nonlin
        }
    }

    /// Recompute the flow from the chamber pressures and move the volume of one step.
    ///
    /// `chambers` is the registry the endpoint ids were resolved against.
    pub fn recompute_flow(&mut self, chambers: &mut [Chamber], dt: Real) {
        if !self.is_enabled {
            self.flow = 0.0;
            self.shortfall = 0.0;
            return;
        }

        let p1 = chambers[self.from.index()].pres();
        let p2 = chambers[self.to.index()].pres();

        self.resistance = self.resistance_for(p1, p2);

        if self.no_flow {
            self.flow = 0.0;
        } else {
            self.flow = (p1 - p2) / self.resistance;
            if self.no_backflow && self.flow < 0.0 {
                self.flow = 0.0;
            }
        }

        let dvol = self.flow * dt;
        self.shortfall = if dvol > 0.0 {
            transfer(chambers, self.from, self.to, dvol)
        } else if dvol < 0.0 {
            transfer(chambers, self.to, self.from, -dvol)
        } else {
            0.0
        };
    }
}

/// Move `dvol` from `giver` to `taker`, delivering only what was displaced.
fn transfer(chambers: &mut [Chamber], giver: ChamberId, taker: ChamberId, dvol: Real) -> Real {
    let shortfall = chambers[giver.index()].remove_volume(dvol);
    let displaced = dvol - shortfall;
    if displaced > 0.0 {
        let refused = chambers[taker.index()].receive_volume(displaced);
        if refused > 0.0 {
            chambers[giver.index()].receive_volume(refused);
        }
    }
    shortfall
}

const VESSEL_FIELDS: &[&str] = &[
    "flow",
    "resistance",
    "shortfall",
    "r_for",
    "r_back",
    "r_k1",
    "r_k2",
    "no_flow",
    "no_backflow",
    "is_enabled",
];

impl Probe for Vessel {
    fn fields(&self) -> &'static [&'static str] {
        VESSEL_FIELDS
    }

    fn read(&self, field: &str) -> Option<Real> {
        let value = match field {
            "flow" => self.flow,
            "resistance" => self.resistance,
            "shortfall" => self.shortfall,
            "r_for" => self.r_for,
            "r_back" => self.r_back,
            "r_k1" => self.r_k1,
            "r_k2" => self.r_k2,
            "no_flow" => flag(self.no_flow),
            "no_backflow" => flag(self.no_backflow),
            "is_enabled" => flag(self.is_enabled),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chamber::ChamberParams;

    fn pair(vol_a: Real, vol_b: Real) -> Vec<Chamber> {
        let mut chambers = vec![
            Chamber::compliance("A", ChamberParams::new(vol_a, 0.0, 1.0)).unwrap(),
            Chamber::compliance("B", ChamberParams::new(vol_b, 0.0, 1.0)).unwrap(),
        ];
        for c in chambers.iter_mut() {
            c.recompute_pressure();
        }
        chambers
    }

    fn vessel(params: VesselParams) -> Vessel {
        Vessel::new(
            "A_B",
            VesselKind::Resistor,
            ChamberId::from_index(0),
            ChamberId::from_index(1),
            params,
        )
        .unwrap()
    }

    #[test]
    fn forward_flow_moves_volume() {
        let mut chambers = pair(10.0, 0.0);
        let mut v = vessel(VesselParams::new(2.0, 4.0));
        v.recompute_flow(&mut chambers, 0.1);
        assert_eq!(v.resistance(), 2.0);
        assert_eq!(v.flow(), 5.0);
        assert!((chambers[0].vol() - 9.5).abs() < 1e-12);
        assert!((chambers[1].vol() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn backward_flow_uses_backward_resistance() {
        let mut chambers = pair(0.0, 10.0);
        let mut v = vessel(VesselParams::new(2.0, 4.0));
        v.recompute_flow(&mut chambers, 0.1);
        assert_eq!(v.resistance(), 4.0);
        assert_eq!(v.flow(), -2.5);
        assert!((chambers[0].vol() - 0.25).abs() < 1e-12);
        assert!((chambers[1].vol() - 9.75).abs() < 1e-12);
    }

    #[test]
    fn no_backflow_clamps_negative_flow() {
        let mut chambers = pair(0.0, 10.0);
        let mut v = vessel(VesselParams::new(1.0, 1.0).no_backflow());
        v.recompute_flow(&mut chambers, 0.1);
        assert_eq!(v.flow(), 0.0);
        assert_eq!(chambers[1].vol(), 10.0);
    }

    #[test]
    fn no_flow_blocks_everything() {
        let mut chambers = pair(10.0, 0.0);
        let mut v = vessel(VesselParams::new(1.0, 1.0).no_flow());
        v.recompute_flow(&mut chambers, 0.1);
        assert_eq!(v.flow(), 0.0);
        assert_eq!(chambers[0].vol(), 10.0);
    }

    #[test]
    fn nonlinear_resistance_lags_one_step() {
        let mut chambers = pair(10.0, 0.0);
        let mut v = vessel(VesselParams::new(1.0, 1.0).with_nonlinear(0.1, 0.01));
        v.recompute_flow(&mut chambers, 0.001);
        // first evaluation sees the initial zero flow
        assert_eq!(v.resistance(), 1.0);
        let first_flow = v.flow();
        assert_eq!(first_flow, 10.0);

        v.recompute_flow(&mut chambers, 0.001);
        let expected = 1.0 + 0.1 * first_flow + 0.01 * first_flow * first_flow;
        assert!((v.resistance() - expected).abs() < 1e-12);
    }

    #[test]
    fn disabled_vessel_holds_zero_flow() {
        let mut chambers = pair(10.0, 0.0);
        let mut v = vessel(VesselParams::new(1.0, 1.0).disabled());
        for _ in 0..10 {
            v.recompute_flow(&mut chambers, 0.1);
        }
        assert_eq!(v.flow(), 0.0);
        assert_eq!(chambers[0].vol(), 10.0);
        assert_eq!(chambers[1].vol(), 0.0);
    }

    #[test]
    fn overdraw_is_clamped_and_conserved() {
        let mut chambers = pair(1.0, 0.0);
        let mut v = vessel(VesselParams::new(0.1, 0.1));
        // flow = 10, dvol = 10 * 0.5 = 5 but only 1 is stored
        v.recompute_flow(&mut chambers, 0.5);
        assert_eq!(chambers[0].vol(), 0.0);
        assert!((v.shortfall() - 4.0).abs() < 1e-12);
        assert!((chambers[1].vol() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disabled_receiver_returns_volume_to_giver() {
        let mut chambers = pair(10.0, 0.0);
        chambers[1].is_enabled = false;
        let mut v = vessel(VesselParams::new(1.0, 1.0));
        v.recompute_flow(&mut chambers, 0.1);
        assert!(v.flow() > 0.0);
        assert_eq!(chambers[0].vol(), 10.0);
        assert_eq!(chambers[1].vol(), 0.0);
    }

    #[test]
    fn rejects_zero_resistance() {
        let err = Vessel::new(
            "bad",
            VesselKind::Valve,
            ChamberId::from_index(0),
            ChamberId::from_index(1),
            VesselParams::new(0.0, 1.0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("r_for"));
    }

    #[test]
    fn rejects_linear_term_that_can_cancel_resistance() {
        // r_for + r_k1 * flow hits zero at flow = -1
        let err = Vessel::new(
            "A_B",
            VesselKind::Resistor,
            ChamberId::from_index(0),
            ChamberId::from_index(1),
            VesselParams::new(1.0, 1.0).with_nonlinear(1.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ElementError::InvalidParameter { field: "r_k1", .. }
        ));
    }

    #[test]
    fn accepted_nonlinear_vessel_stays_finite_under_backflow() {
        // A(vol 10, u_vol 10) sits below B(vol 11, u_vol 10)
        let mut chambers = vec![
            Chamber::compliance("A", ChamberParams::new(10.0, 10.0, 1.0)).unwrap(),
            Chamber::compliance("B", ChamberParams::new(11.0, 10.0, 1.0)).unwrap(),
        ];
        let mut v = vessel(VesselParams::new(1.0, 1.0).with_nonlinear(1.0, 1.0));
        for _ in 0..50 {
            for c in chambers.iter_mut() {
                c.recompute_pressure();
            }
            v.recompute_flow(&mut chambers, 0.01);
            assert!(v.resistance() > 0.0);
            assert!(v.flow().is_finite());
        }
        let total = chambers[0].vol() + chambers[1].vol();
        assert!((total - 21.0).abs() < 1e-12);
    }
}
