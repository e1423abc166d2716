use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream adoption rows are passed through untouched, so they stay as raw JSON.
pub type AdoptionRecord = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// The closed set of facility categories the map understands.
///
/// Every facility is tagged with at most one of these. Records that match
/// none stay untagged and are only shown when no category filter is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalCategory {
    Hospital,
    Pharmacy,
    Care,
    Shop,
    Cafe,
    Culture,
    Funeral,
    Poopbag,
}

impl CanonicalCategory {
    pub const ALL: [CanonicalCategory; 8] = [
        CanonicalCategory::Hospital,
        CanonicalCategory::Pharmacy,
        CanonicalCategory::Care,
        CanonicalCategory::Shop,
        CanonicalCategory::Cafe,
        CanonicalCategory::Culture,
        CanonicalCategory::Funeral,
        CanonicalCategory::Poopbag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalCategory::Hospital => "hospital",
            CanonicalCategory::Pharmacy => "pharmacy",
            CanonicalCategory::Care => "care",
            CanonicalCategory::Shop => "shop",
            CanonicalCategory::Cafe => "cafe",
            CanonicalCategory::Culture => "culture",
            CanonicalCategory::Funeral => "funeral",
            CanonicalCategory::Poopbag => "poopbag",
        }
    }

    /// Korean display label, matching what the facility popups show.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalCategory::Hospital => "동물병원",
            CanonicalCategory::Pharmacy => "동물약국",
            CanonicalCategory::Care => "미용샵",
            CanonicalCategory::Shop => "동물용품",
            CanonicalCategory::Cafe => "동물카페",
            CanonicalCategory::Culture => "문화시설",
            CanonicalCategory::Funeral => "장례시설",
            CanonicalCategory::Poopbag => "배변봉투함",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        CanonicalCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pet facility as held by the map session. `category` is computed once at
/// decode time from the raw category string and the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub raw_category: String,
    pub coords: Coordinates,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
    pub category: Option<CanonicalCategory>,
}

impl Facility {
    /// Folds a detail lookup into the base record. Present detail fields win,
    /// absent ones leave the base record untouched.
    pub fn apply_detail(&mut self, detail: &FacilityDetail) {
        if let Some(address) = &detail.address {
            self.address = Some(address.clone());
        }
        if let Some(phone) = &detail.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(url) = &detail.url {
            self.url = Some(url.clone());
        }
        if let Some(opening_hours) = &detail.opening_hours {
            self.opening_hours = Some(opening_hours.clone());
        }
        if let Some(description) = &detail.description {
            self.description = Some(description.clone());
        }
    }
}

/// Richer fields returned by the per-facility detail endpoint. Aliases
/// cover the backend facade's field spellings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityDetail {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "tel")]
    pub phone: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "openinghours")]
    pub opening_hours: Option<String>,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub uri: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    pub total: u64,
}

/// One page of the city adoption listing, passed through from the upstream
/// open-data service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionPage {
    #[serde(rename = "list_total_count")]
    pub total: u64,
    #[serde(rename = "row", default)]
    pub rows: Vec<AdoptionRecord>,
}
