use serde::{Deserialize, Serialize};

/// One rental listing scraped from a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Numeric id taken from the detail-page URL
    pub id: u64,
    pub url: String,
    /// Base monthly rent
    pub rent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condo_fee: Option<u64>,
    /// Monthly property tax
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iptu: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_area: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_suite_bathrooms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_spaces: Option<u64>,
}

impl ListingRecord {
    /// Create a record with only the mandatory fields set
    pub fn new(id: u64, url: impl Into<String>, rent: u64) -> Self {
        Self {
            id,
            url: url.into(),
            rent,
            condo_fee: None,
            iptu: None,
            total_area: None,
            usable_area: None,
            bedrooms: None,
            bathrooms: None,
            en_suite_bathrooms: None,
            parking_spaces: None,
        }
    }

    /// Rent plus condominium fee plus property tax
    pub fn total_cost(&self) -> u64 {
        self.rent
            .saturating_add(self.condo_fee.unwrap_or(0))
            .saturating_add(self.iptu.unwrap_or(0))
    }

    /// Bedrooms, falling back to en-suite bathrooms when the site omits bedrooms
    pub fn room_count(&self) -> u64 {
        self.bedrooms.or(self.en_suite_bathrooms).unwrap_or(0)
    }

    /// Regular and en-suite bathrooms combined
    pub fn bathroom_count(&self) -> u64 {
        self.bathrooms
            .unwrap_or(0)
            .saturating_add(self.en_suite_bathrooms.unwrap_or(0))
    }
}
