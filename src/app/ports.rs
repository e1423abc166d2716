use crate::domain::{AdoptionPage, Coordinates, Facility, FacilityDetail, SearchResults};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Opaque handle to a live marker owned by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub Uuid);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The map rendering collaborator as the sync engine sees it: marker
/// lifecycle, one info window, camera moves and geocoding. Injected
/// explicitly so the engine never touches an ambient SDK handle.
pub trait MapPort {
    fn create_marker(&mut self, facility: &Facility) -> MarkerId;
    fn destroy_marker(&mut self, marker: MarkerId);
    fn open_popup(&mut self, marker: MarkerId, facility: &Facility);
    fn close_popup(&mut self, marker: MarkerId);
    fn pan_to(&mut self, center: Coordinates);
    fn geocode(&mut self, query: &str) -> Option<Coordinates>;
}

/// REST backend the locator fetches from. Fetch failures come back as
/// errors here; the session decides how to degrade.
#[async_trait]
pub trait BackendPort: Send + Sync {
    async fn facilities_by_district(&self, gu: &str) -> Result<Vec<Facility>>;
    async fn facility_detail(&self, id: &str) -> Result<FacilityDetail>;
    async fn search(&self, query: &str) -> Result<SearchResults>;
    async fn adoption_page(&self, start: u32, end: u32) -> Result<AdoptionPage>;
    async fn ask(&self, message: &str) -> Result<String>;
}
