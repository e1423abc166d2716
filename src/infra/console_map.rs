use crate::app::ports::{MapPort, MarkerId};
use crate::districts;
use crate::domain::{Coordinates, Facility};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Terminal-facing map implementation: marker operations become log lines.
/// Stands in for the maps SDK during CLI runs and demos.
pub struct ConsoleMap {
    markers: HashMap<MarkerId, String>,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }

    pub fn live_marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl Default for ConsoleMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapPort for ConsoleMap {
    fn create_marker(&mut self, facility: &Facility) -> MarkerId {
        let marker = MarkerId(Uuid::new_v4());
        let category = facility
            .category
            .map(|c| c.label())
            .unwrap_or("미분류");
        info!(
            %marker,
            name = %facility.name,
            category,
            lat = facility.coords.lat,
            lng = facility.coords.lng,
            "marker created"
        );
        self.markers.insert(marker, facility.name.clone());
        marker
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        let name = self.markers.remove(&marker).unwrap_or_default();
        info!(%marker, name = %name, "marker destroyed");
    }

    fn open_popup(&mut self, marker: MarkerId, facility: &Facility) {
        info!(
            %marker,
            name = %facility.name,
            address = facility.address.as_deref().unwrap_or("-"),
            phone = facility.phone.as_deref().unwrap_or("-"),
            hours = facility.opening_hours.as_deref().unwrap_or("-"),
            "popup opened"
        );
    }

    fn close_popup(&mut self, marker: MarkerId) {
        info!(%marker, "popup closed");
    }

    fn pan_to(&mut self, center: Coordinates) {
        info!(lat = center.lat, lng = center.lng, "map panned");
    }

    fn geocode(&mut self, query: &str) -> Option<Coordinates> {
        // Without a real SDK only district names resolve, from the static table
        districts::center_of(query)
    }
}
