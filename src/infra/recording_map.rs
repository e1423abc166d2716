use crate::app::ports::{MapPort, MarkerId};
use crate::domain::{Coordinates, Facility};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One call made against the map, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    CreateMarker {
        facility_id: String,
        marker: MarkerId,
    },
    DestroyMarker {
        marker: MarkerId,
    },
    OpenPopup {
        facility_id: String,
        marker: MarkerId,
    },
    ClosePopup {
        marker: MarkerId,
    },
    PanTo(Coordinates),
    Geocode(String),
}

/// In-memory map double for testing and development. Records every call,
/// tracks which markers are alive and which popup is open, and answers
/// geocoding from a canned table.
#[derive(Debug, Default)]
pub struct RecordingMap {
    pub ops: Vec<MapOp>,
    alive: HashSet<MarkerId>,
    current_popup: Option<MarkerId>,
    geocode_answers: HashMap<String, Coordinates>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geocode(mut self, query: &str, coords: Coordinates) -> Self {
        self.geocode_answers.insert(query.to_string(), coords);
        self
    }

    pub fn live_marker_count(&self) -> usize {
        self.alive.len()
    }

    pub fn is_alive(&self, marker: MarkerId) -> bool {
        self.alive.contains(&marker)
    }

    /// The popup currently open, if the engine left one open.
    pub fn current_popup(&self) -> Option<MarkerId> {
        self.current_popup
    }

    pub fn created_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, MapOp::CreateMarker { .. }))
            .count()
    }

    pub fn destroyed_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, MapOp::DestroyMarker { .. }))
            .count()
    }

    pub fn pans(&self) -> Vec<Coordinates> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                MapOp::PanTo(center) => Some(*center),
                _ => None,
            })
            .collect()
    }
}

impl MapPort for RecordingMap {
    fn create_marker(&mut self, facility: &Facility) -> MarkerId {
        let marker = MarkerId(Uuid::new_v4());
        self.alive.insert(marker);
        self.ops.push(MapOp::CreateMarker {
            facility_id: facility.id.clone(),
            marker,
        });
        marker
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        self.alive.remove(&marker);
        self.ops.push(MapOp::DestroyMarker { marker });
    }

    fn open_popup(&mut self, marker: MarkerId, facility: &Facility) {
        self.current_popup = Some(marker);
        self.ops.push(MapOp::OpenPopup {
            facility_id: facility.id.clone(),
            marker,
        });
    }

    fn close_popup(&mut self, marker: MarkerId) {
        if self.current_popup == Some(marker) {
            self.current_popup = None;
        }
        self.ops.push(MapOp::ClosePopup { marker });
    }

    fn pan_to(&mut self, center: Coordinates) {
        self.ops.push(MapOp::PanTo(center));
    }

    fn geocode(&mut self, query: &str) -> Option<Coordinates> {
        self.ops.push(MapOp::Geocode(query.to_string()));
        self.geocode_answers.get(query).copied()
    }
}
