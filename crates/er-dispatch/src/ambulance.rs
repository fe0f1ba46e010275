//! Static ambulance data and deployment status.

use er_core::{Position, SegmentId, VehicleId};

use crate::{Candidate, DispatchError, DispatchResult};

/// One ambulance known to the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub struct Ambulance {
    pub id:        VehicleId,
    /// Display name, e.g. `"ambulance0"`.
    pub name:      String,
    readiness:     f64,
    /// Segment the ambulance is parked on between missions.
    pub anchor:    SegmentId,
    pub deployed:  bool,
}

impl Ambulance {
    /// Fails if `readiness` is not a number in `[0, 100]`.
    pub fn new(
        id:        VehicleId,
        name:      impl Into<String>,
        readiness: f64,
        anchor:    impl Into<SegmentId>,
    ) -> DispatchResult<Self> {
        if !(0.0..=100.0).contains(&readiness) {
            return Err(DispatchError::InvalidReadiness { ambulance: id, readiness });
        }
        Ok(Self { id, name: name.into(), readiness, anchor: anchor.into(), deployed: false })
    }

    #[inline]
    pub fn readiness(&self) -> f64 {
        self.readiness
    }

    /// Snapshot this ambulance as a dispatch candidate.
    pub fn candidate(&self, position: Option<Position>, congestion: Option<f64>) -> Candidate {
        Candidate {
            id: self.id,
            readiness: self.readiness,
            anchor: self.anchor.clone(),
            position,
            congestion,
        }
    }
}

/// Every ambulance of the run, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct AmbulanceFleet {
    ambulances: Vec<Ambulance>,
}

impl AmbulanceFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ambulance: Ambulance) -> DispatchResult<()> {
        if self.contains(ambulance.id) {
            return Err(DispatchError::DuplicateAmbulance(ambulance.id));
        }
        self.ambulances.push(ambulance);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ambulances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ambulances.is_empty()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.ambulances.iter().any(|a| a.id == id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&Ambulance> {
        self.ambulances.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ambulance> + '_ {
        self.ambulances.iter()
    }

    /// Ambulances not yet sent to an accident.
    pub fn available(&self) -> impl Iterator<Item = &Ambulance> + '_ {
        self.ambulances.iter().filter(|a| !a.deployed)
    }

    /// Mark `id` as deployed.  Returns `false` if it is unknown or was
    /// already deployed.
    pub fn mark_deployed(&mut self, id: VehicleId) -> bool {
        match self.ambulances.iter_mut().find(|a| a.id == id) {
            Some(a) if !a.deployed => {
                a.deployed = true;
                true
            }
            _ => false,
        }
    }
}

impl FromIterator<Ambulance> for AmbulanceFleet {
    /// Later duplicates of an ID are dropped.
    fn from_iter<I: IntoIterator<Item = Ambulance>>(iter: I) -> Self {
        let mut fleet = Self::new();
        for a in iter {
            let _ = fleet.add(a);
        }
        fleet
    }
}
