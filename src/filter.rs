use crate::domain::{CanonicalCategory, Facility};
use serde::{Deserialize, Serialize};

/// Activation flags over the closed category set. Indexing by enum keeps the
/// set of filterable categories fixed at exactly the known eight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    flags: [bool; CanonicalCategory::ALL.len()],
}

impl CategorySet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(categories: &[CanonicalCategory]) -> Self {
        let mut set = Self::default();
        for category in categories {
            set.flags[*category as usize] = true;
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        !self.flags.iter().any(|active| *active)
    }

    pub fn contains(&self, category: CanonicalCategory) -> bool {
        self.flags[category as usize]
    }

    /// Flips one flag and returns its new state.
    pub fn toggle(&mut self, category: CanonicalCategory) -> bool {
        let flag = &mut self.flags[category as usize];
        *flag = !*flag;
        *flag
    }

    pub fn clear(&mut self) {
        self.flags = Default::default();
    }

    pub fn active(&self) -> Vec<CanonicalCategory> {
        CanonicalCategory::ALL
            .iter()
            .copied()
            .filter(|category| self.contains(*category))
            .collect()
    }
}

/// Active category filters plus the selected district. Fresh state has no
/// category active and no district chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: CategorySet,
    pub district: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_category(&mut self, category: CanonicalCategory) -> bool {
        self.categories.toggle(category)
    }

    /// Clears every category flag. The selected district is navigation, not a
    /// filter, and stays as it is.
    pub fn reset_categories(&mut self) {
        self.categories.clear();
    }
}

/// Computes the visible subset of `facilities` under the active filters.
///
/// With no category active this is the identity, order preserved. Otherwise
/// it is a stable filter keeping facilities whose tag is active; untagged
/// facilities only survive the unfiltered case.
pub fn recompute_visible(facilities: &[Facility], filters: &FilterState) -> Vec<Facility> {
    if filters.categories.is_empty() {
        return facilities.to_vec();
    }

    facilities
        .iter()
        .filter(|facility| {
            facility
                .category
                .map_or(false, |category| filters.categories.contains(category))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::domain::Coordinates;

    fn facility(id: &str, raw_category: &str, name: &str) -> Facility {
        Facility {
            id: id.to_string(),
            name: name.to_string(),
            raw_category: raw_category.to_string(),
            coords: Coordinates {
                lat: 37.5665,
                lng: 126.9780,
            },
            address: None,
            phone: None,
            url: None,
            opening_hours: None,
            description: None,
            category: classify(raw_category, name),
        }
    }

    fn sample_facilities() -> Vec<Facility> {
        vec![
            facility("f1", "koah:VeterinaryHospital", "행복 동물병원"),
            facility("f2", "", "멍멍약국"),
            facility("f3", "기타", "ABC 카페"),
            facility("f4", "", "이름없는 시설"),
            facility("f5", "", "서초 동물병원"),
        ]
    }

    fn ids(facilities: &[Facility]) -> Vec<&str> {
        facilities.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn no_active_filter_passes_everything_through_in_order() {
        let facilities = sample_facilities();
        let visible = recompute_visible(&facilities, &FilterState::new());
        assert_eq!(ids(&visible), vec!["f1", "f2", "f3", "f4", "f5"]);
    }

    #[test]
    fn single_filter_keeps_exactly_the_matching_tag() {
        let facilities = sample_facilities();
        let mut filters = FilterState::new();
        filters.toggle_category(CanonicalCategory::Hospital);

        let visible = recompute_visible(&facilities, &filters);
        assert_eq!(ids(&visible), vec!["f1", "f5"]);
    }

    #[test]
    fn untagged_facilities_only_show_when_unfiltered() {
        let facilities = sample_facilities();

        let unfiltered = recompute_visible(&facilities, &FilterState::new());
        assert!(ids(&unfiltered).contains(&"f4"));

        let mut filters = FilterState::new();
        filters.toggle_category(CanonicalCategory::Cafe);
        let filtered = recompute_visible(&facilities, &filters);
        assert_eq!(ids(&filtered), vec!["f3"]);
    }

    #[test]
    fn widening_the_filter_preserves_relative_order() {
        let facilities = sample_facilities();
        let mut filters = FilterState::new();
        filters.toggle_category(CanonicalCategory::Hospital);
        let narrow = recompute_visible(&facilities, &filters);

        filters.toggle_category(CanonicalCategory::Cafe);
        let wide = recompute_visible(&facilities, &filters);

        assert_eq!(ids(&narrow), vec!["f1", "f5"]);
        assert_eq!(ids(&wide), vec!["f1", "f3", "f5"]);
    }

    #[test]
    fn toggle_flips_exactly_one_flag() {
        let mut filters = FilterState::new();
        assert!(filters.toggle_category(CanonicalCategory::Shop));
        assert!(filters.categories.contains(CanonicalCategory::Shop));
        assert_eq!(filters.categories.active(), vec![CanonicalCategory::Shop]);

        assert!(!filters.toggle_category(CanonicalCategory::Shop));
        assert!(filters.categories.is_empty());
    }

    #[test]
    fn reset_is_equivalent_to_never_having_filtered() {
        let facilities = sample_facilities();

        let mut filters = FilterState::new();
        filters.district = Some("강남구".to_string());
        filters.toggle_category(CanonicalCategory::Hospital);
        filters.toggle_category(CanonicalCategory::Funeral);
        filters.reset_categories();

        let after_reset = recompute_visible(&facilities, &filters);
        let never_filtered = recompute_visible(&facilities, &FilterState::new());
        assert_eq!(ids(&after_reset), ids(&never_filtered));

        // district selection is untouched by a category reset
        assert_eq!(filters.district.as_deref(), Some("강남구"));
    }
}
