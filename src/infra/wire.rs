use crate::classify::classify;
use crate::domain::{Coordinates, Facility};
use crate::error::{PetmapError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// One facility row as the lookup endpoint sends it. Aliases cover the
/// GraphDB facade's field spellings (`tel`, `desc`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilityRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
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

impl FacilityRow {
    /// Upgrades a wire row to a domain facility, tagging it with its
    /// canonical category. Rows without an id, a name or full coordinates
    /// are rejected.
    pub fn into_facility(self) -> Result<Facility> {
        let id = self
            .id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PetmapError::MissingField("id".to_string()))?;
        let name = self
            .name
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PetmapError::MissingField("name".to_string()))?;
        let lat = self
            .lat
            .ok_or_else(|| PetmapError::MissingField("lat".to_string()))?;
        let lng = self
            .lng
            .ok_or_else(|| PetmapError::MissingField("lng".to_string()))?;

        let raw_category = self.category.unwrap_or_default();
        let category = classify(&raw_category, &name);

        Ok(Facility {
            id,
            name,
            raw_category,
            coords: Coordinates { lat, lng },
            address: self.address,
            phone: self.phone,
            url: self.url,
            opening_hours: self.opening_hours,
            description: self.description,
            category,
        })
    }
}

/// Decodes a facility-lookup payload. Individual malformed rows are dropped
/// with a warning rather than failing the response; the second value is how
/// many were dropped.
pub fn decode_facilities(payload: &Value) -> Result<(Vec<Facility>, usize)> {
    let rows = payload.as_array().ok_or_else(|| PetmapError::Api {
        message: "facility payload is not an array".to_string(),
    })?;

    let mut facilities = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for row_value in rows {
        let row: FacilityRow = match serde_json::from_value(row_value.clone()) {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "skipping undecodable facility row");
                dropped += 1;
                continue;
            }
        };
        match row.into_facility() {
            Ok(facility) => facilities.push(facility),
            Err(e) => {
                warn!(error = %e, "skipping incomplete facility row");
                dropped += 1;
            }
        }
    }

    Ok((facilities, dropped))
}

/// Chat relay reply. The backend answers either `response` or `error`,
/// never both.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatReply {
    pub fn into_message(self) -> Result<String> {
        if let Some(response) = self.response {
            return Ok(response);
        }
        Err(PetmapError::Api {
            message: self
                .error
                .unwrap_or_else(|| "chat reply carried neither response nor error".to_string()),
        })
    }
}
