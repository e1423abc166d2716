use crate::app::ports::{MapPort, MarkerId};
use crate::districts;
use crate::domain::{CanonicalCategory, Facility, FacilityDetail, SearchHit};
use crate::error::Result;
use crate::filter::{recompute_visible, FilterState};
use crate::markers::MarkerSet;
use crate::metrics::{FetchMetrics, SyncMetrics};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Token for one in-flight district fetch. Results are applied only while
/// the ticket is still the newest one issued, so a slow response for a
/// district the user already left can never overwrite fresher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    district: String,
}

impl FetchTicket {
    pub fn district(&self) -> &str {
        &self.district
    }
}

#[derive(Debug, Clone)]
struct ActivePopup {
    facility_id: String,
    marker: MarkerId,
}

/// The filter/sync engine: owns the facility list for the current district,
/// the active filters, the live markers and the single detail popup, and
/// keeps them consistent with each other through every state change.
///
/// All mutation happens through `&mut self` with the map passed in per call,
/// so recomputations never interleave and the engine never holds an ambient
/// SDK handle.
pub struct MapSession {
    filters: FilterState,
    facilities: Vec<Facility>,
    visible: Vec<Facility>,
    markers: MarkerSet,
    popup: Option<ActivePopup>,
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl MapSession {
    pub fn new() -> Self {
        Self {
            filters: FilterState::new(),
            facilities: Vec::new(),
            visible: Vec::new(),
            markers: MarkerSet::new(),
            popup: None,
            generation: 0,
            fetched_at: None,
        }
    }

    /// Switches to a new district: clears the stale facility list right away
    /// (no flash of old markers), pans the camera to the district center and
    /// issues a ticket for the fetch the caller should now run. The active
    /// category filters persist and will apply to the new set.
    pub fn change_district(&mut self, gu: &str, map: &mut dyn MapPort) -> FetchTicket {
        self.generation += 1;
        self.filters.district = Some(gu.to_string());
        self.facilities.clear();
        self.resync(map);

        match districts::center_of(gu) {
            Some(center) => map.pan_to(center),
            None => warn!(district = gu, "no center known for district, skipping pan"),
        }

        info!(
            district = gu,
            generation = self.generation,
            "district changed, fetch pending"
        );
        FetchTicket {
            generation: self.generation,
            district: gu.to_string(),
        }
    }

    /// Applies the outcome of a district fetch. Stale tickets are discarded
    /// without touching state. A failed fetch degrades to an empty facility
    /// list rather than surfacing an error. Returns whether the outcome was
    /// applied.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<Facility>>,
        map: &mut dyn MapPort,
    ) -> bool {
        if ticket.generation != self.generation {
            FetchMetrics::record_stale_discarded();
            debug!(
                district = %ticket.district,
                stale_generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        match outcome {
            Ok(facilities) => {
                let unclassified = facilities.iter().filter(|f| f.category.is_none()).count();
                FetchMetrics::record_unclassified(unclassified);
                info!(
                    district = %ticket.district,
                    count = facilities.len(),
                    unclassified,
                    "facilities loaded"
                );
                self.facilities = facilities;
            }
            Err(e) => {
                warn!(
                    district = %ticket.district,
                    error = %e,
                    "facility fetch failed, showing no facilities"
                );
                self.facilities = Vec::new();
            }
        }

        self.fetched_at = Some(Utc::now());
        self.resync(map);
        true
    }

    /// Flips one category filter and reconciles. Returns the new flag state.
    pub fn toggle_category(&mut self, category: CanonicalCategory, map: &mut dyn MapPort) -> bool {
        let active = self.filters.toggle_category(category);
        debug!(category = %category, active, "category filter toggled");
        self.resync(map);
        active
    }

    /// Clears every category filter; the full facility set becomes visible
    /// again. The selected district is untouched.
    pub fn reset_filters(&mut self, map: &mut dyn MapPort) {
        self.filters.reset_categories();
        self.resync(map);
    }

    /// Opens the detail popup for a currently visible facility, closing any
    /// previous popup first. Selecting a facility without a marker is
    /// ignored.
    pub fn select_detail(&mut self, facility_id: &str, map: &mut dyn MapPort) -> bool {
        let marker = match self.markers.get(facility_id) {
            Some(marker) => marker,
            None => {
                warn!(facility_id, "no visible marker for facility, ignoring selection");
                return false;
            }
        };

        self.close_detail(map);

        match self.visible.iter().find(|f| f.id == facility_id) {
            Some(facility) => {
                map.open_popup(marker, facility);
                SyncMetrics::record_popup_opened();
                debug!(facility_id, name = %facility.name, "opened detail popup");
                self.popup = Some(ActivePopup {
                    facility_id: facility_id.to_string(),
                    marker,
                });
                true
            }
            None => false,
        }
    }

    /// Closes the detail popup if one is open. Closing when none is open is
    /// a no-op.
    pub fn close_detail(&mut self, map: &mut dyn MapPort) {
        if let Some(popup) = self.popup.take() {
            map.close_popup(popup.marker);
            debug!(facility_id = %popup.facility_id, "closed detail popup");
        }
    }

    /// Folds a detail lookup into the loaded record and refreshes the popup
    /// when it is showing that facility. Details for facilities that are no
    /// longer loaded are dropped.
    pub fn merge_detail(
        &mut self,
        facility_id: &str,
        detail: &FacilityDetail,
        map: &mut dyn MapPort,
    ) -> bool {
        let mut known = false;
        if let Some(facility) = self.facilities.iter_mut().find(|f| f.id == facility_id) {
            facility.apply_detail(detail);
            known = true;
        }
        if let Some(facility) = self.visible.iter_mut().find(|f| f.id == facility_id) {
            facility.apply_detail(detail);
        }
        if !known {
            debug!(facility_id, "detail for unknown facility ignored");
            return false;
        }

        if let Some(popup) = &self.popup {
            if popup.facility_id == facility_id {
                if let Some(facility) = self.visible.iter().find(|f| f.id == facility_id) {
                    map.open_popup(popup.marker, facility);
                }
            }
        }
        true
    }

    /// Routes a search hit to the map: a hit naming a loaded facility opens
    /// its popup, anything else is geocoded by label and panned to.
    pub fn focus_search_result(&mut self, hit: &SearchHit, map: &mut dyn MapPort) -> bool {
        let loaded = self
            .visible
            .iter()
            .find(|f| f.id == hit.uri || f.name == hit.label)
            .map(|f| f.id.clone());
        if let Some(facility_id) = loaded {
            return self.select_detail(&facility_id, map);
        }

        if let Some(center) = map.geocode(&hit.label) {
            map.pan_to(center);
            return true;
        }

        warn!(label = %hit.label, "search hit could not be located");
        false
    }

    /// Recomputes the visible subset and reconciles markers against it. A
    /// popup whose facility drops out of view is closed before its marker is
    /// destroyed.
    fn resync(&mut self, map: &mut dyn MapPort) {
        self.visible = recompute_visible(&self.facilities, &self.filters);

        let popup_stale = match &self.popup {
            Some(popup) => !self.visible.iter().any(|f| f.id == popup.facility_id),
            None => false,
        };
        if popup_stale {
            self.close_detail(map);
        }

        let outcome = self.markers.sync(&self.visible, map);
        SyncMetrics::record_reconciliation(outcome.created, outcome.destroyed, self.visible.len());
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn visible(&self) -> &[Facility] {
        &self.visible
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn district(&self) -> Option<&str> {
        self.filters.district.as_deref()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn popup_facility_id(&self) -> Option<&str> {
        self.popup.as_ref().map(|p| p.facility_id.as_str())
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::domain::Coordinates;
    use crate::error::PetmapError;
    use crate::infra::recording_map::{MapOp, RecordingMap};

    fn facility(id: &str, raw_category: &str, name: &str) -> Facility {
        Facility {
            id: id.to_string(),
            name: name.to_string(),
            raw_category: raw_category.to_string(),
            coords: Coordinates {
                lat: 37.5172,
                lng: 127.0473,
            },
            address: None,
            phone: None,
            url: None,
            opening_hours: None,
            description: None,
            category: classify(raw_category, name),
        }
    }

    fn gangnam_facilities() -> Vec<Facility> {
        vec![
            facility("f1", "koah:VeterinaryHospital", "강남 24시 동물병원"),
            facility("f2", "", "멍멍약국"),
            facility("f3", "기타", "고양이카페 모모"),
        ]
    }

    fn load_district(session: &mut MapSession, map: &mut RecordingMap, gu: &str, facilities: Vec<Facility>) {
        let ticket = session.change_district(gu, map);
        assert!(session.complete_fetch(&ticket, Ok(facilities), map));
    }

    #[test]
    fn fetch_flow_creates_markers_and_pans() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());

        assert_eq!(session.district(), Some("강남구"));
        assert_eq!(session.visible().len(), 3);
        assert_eq!(session.marker_count(), 3);
        assert_eq!(map.live_marker_count(), 3);
        let expected = crate::districts::center_of("강남구").unwrap();
        assert_eq!(map.pans(), vec![expected]);
        assert!(session.fetched_at().is_some());
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        let ticket_a = session.change_district("강남구", &mut map);
        let ticket_b = session.change_district("서초구", &mut map);

        // District A resolves late, after B was selected
        assert!(!session.complete_fetch(&ticket_a, Ok(gangnam_facilities()), &mut map));
        assert!(session.visible().is_empty());
        assert_eq!(map.live_marker_count(), 0);

        let seocho = vec![facility("s1", "", "서초 동물병원")];
        assert!(session.complete_fetch(&ticket_b, Ok(seocho), &mut map));
        assert_eq!(session.visible().len(), 1);
        assert_eq!(session.visible()[0].id, "s1");
        assert_eq!(session.district(), Some("서초구"));
    }

    #[test]
    fn failed_fetch_degrades_to_an_empty_district() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        let ticket = session.change_district("강남구", &mut map);
        let applied = session.complete_fetch(
            &ticket,
            Err(PetmapError::Api {
                message: "backend unavailable".to_string(),
            }),
            &mut map,
        );

        assert!(applied);
        assert!(session.visible().is_empty());
        assert_eq!(map.live_marker_count(), 0);
        assert!(session.fetched_at().is_some());
    }

    #[test]
    fn filters_persist_across_district_changes() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.toggle_category(CanonicalCategory::Hospital, &mut map);
        assert_eq!(session.visible().len(), 1);

        let seocho = vec![
            facility("s1", "", "서초 동물병원"),
            facility("s2", "", "서초 애견카페"),
        ];
        load_district(&mut session, &mut map, "서초구", seocho);

        // hospital filter still applies to the new district
        assert_eq!(session.visible().len(), 1);
        assert_eq!(session.visible()[0].id, "s1");
    }

    #[test]
    fn district_change_clears_markers_before_the_new_fetch_lands() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        assert_eq!(map.live_marker_count(), 3);

        session.change_district("서초구", &mut map);
        assert_eq!(map.live_marker_count(), 0);
        assert!(session.visible().is_empty());
    }

    #[test]
    fn unknown_district_is_fetched_but_not_panned_to() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        let ticket = session.change_district("부산진구", &mut map);
        assert!(map.pans().is_empty());
        assert_eq!(ticket.district(), "부산진구");

        // the backend answers unknown districts with an empty list
        assert!(session.complete_fetch(&ticket, Ok(Vec::new()), &mut map));
        assert!(session.visible().is_empty());
    }

    #[test]
    fn at_most_one_popup_is_open() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());

        assert!(session.select_detail("f1", &mut map));
        let f1_marker = map.current_popup().unwrap();

        assert!(session.select_detail("f2", &mut map));
        assert_eq!(session.popup_facility_id(), Some("f2"));

        // f1's popup was closed before f2's opened
        let close_idx = map
            .ops
            .iter()
            .position(|op| *op == MapOp::ClosePopup { marker: f1_marker })
            .unwrap();
        let open_idx = map
            .ops
            .iter()
            .position(|op| matches!(op, MapOp::OpenPopup { facility_id, .. } if facility_id == "f2"))
            .unwrap();
        assert!(close_idx < open_idx);
        assert!(map.current_popup().is_some());
    }

    #[test]
    fn closing_without_a_popup_is_a_no_op() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.close_detail(&mut map);
        assert!(map.ops.iter().all(|op| !matches!(op, MapOp::ClosePopup { .. })));

        session.select_detail("f1", &mut map);
        session.close_detail(&mut map);
        session.close_detail(&mut map);
        let closes = map
            .ops
            .iter()
            .filter(|op| matches!(op, MapOp::ClosePopup { .. }))
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn selecting_a_filtered_out_facility_is_ignored() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.toggle_category(CanonicalCategory::Hospital, &mut map);

        assert!(!session.select_detail("f3", &mut map));
        assert!(session.popup_facility_id().is_none());
    }

    #[test]
    fn popup_closes_when_a_filter_hides_its_facility() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.select_detail("f1", &mut map);
        let marker = map.current_popup().unwrap();

        // f1 is a hospital; filtering to cafes hides it
        session.toggle_category(CanonicalCategory::Cafe, &mut map);

        assert!(session.popup_facility_id().is_none());
        assert!(map.current_popup().is_none());

        let close_idx = map
            .ops
            .iter()
            .position(|op| *op == MapOp::ClosePopup { marker })
            .unwrap();
        let destroy_idx = map
            .ops
            .iter()
            .position(|op| *op == MapOp::DestroyMarker { marker })
            .unwrap();
        assert!(close_idx < destroy_idx);
    }

    #[test]
    fn merge_detail_updates_the_record_and_refreshes_the_popup() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.select_detail("f1", &mut map);

        let detail = FacilityDetail {
            phone: Some("02-555-0123".to_string()),
            ..Default::default()
        };
        assert!(session.merge_detail("f1", &detail, &mut map));

        let loaded = session.visible().iter().find(|f| f.id == "f1").unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("02-555-0123"));

        let opens_for_f1 = map
            .ops
            .iter()
            .filter(|op| matches!(op, MapOp::OpenPopup { facility_id, .. } if facility_id == "f1"))
            .count();
        assert_eq!(opens_for_f1, 2);

        assert!(!session.merge_detail("missing", &detail, &mut map));
    }

    #[test]
    fn search_hits_open_popups_or_fall_back_to_geocoding() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new().with_geocode(
            "어딘가 동물병원",
            Coordinates {
                lat: 37.60,
                lng: 127.00,
            },
        );

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());

        let loaded_hit = SearchHit {
            uri: "f2".to_string(),
            label: "멍멍약국".to_string(),
            kind: None,
            description: None,
            category: None,
        };
        assert!(session.focus_search_result(&loaded_hit, &mut map));
        assert_eq!(session.popup_facility_id(), Some("f2"));

        let remote_hit = SearchHit {
            uri: "koah:fac/999".to_string(),
            label: "어딘가 동물병원".to_string(),
            kind: None,
            description: None,
            category: None,
        };
        assert!(session.focus_search_result(&remote_hit, &mut map));
        let pans = map.pans();
        assert_eq!(pans.last(), Some(&Coordinates { lat: 37.60, lng: 127.00 }));

        let unlocatable = SearchHit {
            uri: "koah:fac/1000".to_string(),
            label: "없는 시설".to_string(),
            kind: None,
            description: None,
            category: None,
        };
        assert!(!session.focus_search_result(&unlocatable, &mut map));
    }

    #[test]
    fn reset_restores_the_full_view() {
        let mut session = MapSession::new();
        let mut map = RecordingMap::new();

        load_district(&mut session, &mut map, "강남구", gangnam_facilities());
        session.toggle_category(CanonicalCategory::Hospital, &mut map);
        session.toggle_category(CanonicalCategory::Pharmacy, &mut map);
        assert_eq!(session.visible().len(), 2);

        session.reset_filters(&mut map);
        assert_eq!(session.visible().len(), 3);
        assert_eq!(session.marker_count(), 3);
        assert_eq!(session.district(), Some("강남구"));
    }
}
