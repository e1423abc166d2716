use crate::app::ports::{MapPort, MarkerId};
use crate::domain::Facility;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Create/destroy totals from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: usize,
    pub destroyed: usize,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.destroyed == 0
    }
}

/// Live marker handles keyed by facility id, owned exclusively by the map
/// session. Nothing else creates or destroys markers.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: HashMap<String, MarkerId>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles live markers against the visible subset: destroys every
    /// marker whose facility is gone, creates one for every facility that
    /// lacks one. Afterwards the marker keys are exactly the visible ids,
    /// one marker per id even if the input repeats an id.
    pub fn sync(&mut self, visible: &[Facility], map: &mut dyn MapPort) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let wanted: HashSet<&str> = visible.iter().map(|f| f.id.as_str()).collect();
        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();

        for facility_id in stale {
            if let Some(marker) = self.markers.remove(&facility_id) {
                map.destroy_marker(marker);
                outcome.destroyed += 1;
            }
        }

        for facility in visible {
            if !self.markers.contains_key(&facility.id) {
                let marker = map.create_marker(facility);
                self.markers.insert(facility.id.clone(), marker);
                outcome.created += 1;
            }
        }

        debug!(
            created = outcome.created,
            destroyed = outcome.destroyed,
            live = self.markers.len(),
            "reconciled markers"
        );
        outcome
    }

    /// Destroys every live marker. Returns how many were destroyed.
    pub fn clear(&mut self, map: &mut dyn MapPort) -> usize {
        let count = self.markers.len();
        for (_, marker) in self.markers.drain() {
            map.destroy_marker(marker);
        }
        count
    }

    pub fn get(&self, facility_id: &str) -> Option<MarkerId> {
        self.markers.get(facility_id).copied()
    }

    pub fn contains(&self, facility_id: &str) -> bool {
        self.markers.contains_key(facility_id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
