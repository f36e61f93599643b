use serde::{Deserialize, Serialize};

use crate::models::ListingRecord;

/// Area assumed for listings that do not state one, large enough to pass any sane minimum
pub const UNKNOWN_AREA: u64 = 100_000;

/// Thresholds a listing must meet to be notified on. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub min_total_cost: u64,
    pub max_total_cost: u64,
    pub min_bedrooms: u64,
    /// Regular and en-suite combined
    pub min_bathrooms: u64,
    pub min_total_area: u64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_total_cost: 5_000,
            max_total_cost: 8_000,
            min_bedrooms: 0,
            min_bathrooms: 0,
            min_total_area: 500,
        }
    }
}

/// Why a listing was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooCheap { total_cost: u64 },
    TooExpensive { total_cost: u64 },
    TooFewBedrooms { rooms: u64 },
    TooFewBathrooms { bathrooms: u64 },
    TooSmall { total_area: u64 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::TooCheap { total_cost } => write!(f, "total cost {total_cost} below minimum"),
            Rejection::TooExpensive { total_cost } => {
                write!(f, "total cost {total_cost} above maximum")
            }
            Rejection::TooFewBedrooms { rooms } => write!(f, "{rooms} bedrooms below minimum"),
            Rejection::TooFewBathrooms { bathrooms } => {
                write!(f, "{bathrooms} bathrooms below minimum")
            }
            Rejection::TooSmall { total_area } => write!(f, "total area {total_area} below minimum"),
        }
    }
}

/// Check one listing, stopping at the first failed predicate
pub fn evaluate(record: &ListingRecord, criteria: &FilterCriteria) -> Result<(), Rejection> {
    let total_cost = record.total_cost();
    if total_cost < criteria.min_total_cost {
        return Err(Rejection::TooCheap { total_cost });
    }
    if total_cost > criteria.max_total_cost {
        return Err(Rejection::TooExpensive { total_cost });
    }

    let rooms = record.room_count();
    if rooms < criteria.min_bedrooms {
        return Err(Rejection::TooFewBedrooms { rooms });
    }

    let bathrooms = record.bathroom_count();
    if bathrooms < criteria.min_bathrooms {
        return Err(Rejection::TooFewBathrooms { bathrooms });
    }

    let total_area = record.total_area.unwrap_or(UNKNOWN_AREA);
    if total_area < criteria.min_total_area {
        return Err(Rejection::TooSmall { total_area });
    }

    Ok(())
}

/// Listings meeting `criteria`, in their original order
pub fn filter(records: &[ListingRecord], criteria: &FilterCriteria) -> Vec<ListingRecord> {
    records
        .iter()
        .filter(|record| match evaluate(record, criteria) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Listing {} rejected: {}", record.id, reason);
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_criteria() -> FilterCriteria {
        FilterCriteria {
            min_total_cost: 0,
            max_total_cost: u64::MAX,
            min_bedrooms: 0,
            min_bathrooms: 0,
            min_total_area: 0,
        }
    }

    fn house() -> ListingRecord {
        ListingRecord {
            condo_fee: Some(500),
            iptu: Some(300),
            bedrooms: Some(3),
            bathrooms: Some(2),
            en_suite_bathrooms: Some(1),
            total_area: Some(600),
            ..ListingRecord::new(1, "https://x.test/casa-1.html", 6000)
        }
    }

    #[test]
    fn total_cost_within_bounds_passes() {
        let record = ListingRecord {
            condo_fee: Some(500),
            iptu: Some(300),
            ..ListingRecord::new(1, "https://x.test/1.html", 6000)
        };
        let criteria = FilterCriteria {
            min_total_cost: 5000,
            max_total_cost: 8000,
            ..open_criteria()
        };

        assert_eq!(evaluate(&record, &criteria), Ok(()));
    }

    #[test]
    fn total_cost_over_maximum_is_rejected() {
        let record = ListingRecord {
            condo_fee: Some(500),
            iptu: Some(300),
            ..ListingRecord::new(1, "https://x.test/1.html", 6000)
        };
        let criteria = FilterCriteria {
            min_total_cost: 5000,
            max_total_cost: 6000,
            ..open_criteria()
        };

        assert_eq!(
            evaluate(&record, &criteria),
            Err(Rejection::TooExpensive { total_cost: 6800 })
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let record = ListingRecord::new(1, "https://x.test/1.html", 5000);
        let criteria = FilterCriteria {
            min_total_cost: 5000,
            max_total_cost: 5000,
            ..open_criteria()
        };

        assert_eq!(evaluate(&record, &criteria), Ok(()));
    }

    #[test]
    fn en_suites_stand_in_for_missing_bedrooms() {
        let record = ListingRecord {
            en_suite_bathrooms: Some(2),
            ..ListingRecord::new(1, "https://x.test/1.html", 6000)
        };
        let criteria = FilterCriteria {
            min_bedrooms: 1,
            ..open_criteria()
        };

        assert_eq!(record.room_count(), 2);
        assert_eq!(evaluate(&record, &criteria), Ok(()));
    }

    #[test]
    fn bathrooms_include_en_suites() {
        let criteria = FilterCriteria {
            min_bathrooms: 4,
            ..open_criteria()
        };

        assert_eq!(
            evaluate(&house(), &criteria),
            Err(Rejection::TooFewBathrooms { bathrooms: 3 })
        );
    }

    #[test]
    fn missing_area_is_never_too_small() {
        let record = ListingRecord::new(1, "https://x.test/1.html", 6000);
        for min_total_area in [0, 1, 500, 99_999, UNKNOWN_AREA] {
            let criteria = FilterCriteria {
                min_total_area,
                ..open_criteria()
            };
            assert_eq!(evaluate(&record, &criteria), Ok(()), "min area {min_total_area}");
        }
    }

    #[test]
    fn small_area_is_rejected() {
        let criteria = FilterCriteria {
            min_total_area: 601,
            ..open_criteria()
        };

        assert_eq!(
            evaluate(&house(), &criteria),
            Err(Rejection::TooSmall { total_area: 600 })
        );
    }

    #[test]
    fn loosening_any_bound_keeps_a_passing_record() {
        let record = house();
        let tight = FilterCriteria {
            min_total_cost: 6800,
            max_total_cost: 6800,
            min_bedrooms: 3,
            min_bathrooms: 3,
            min_total_area: 600,
        };
        assert_eq!(evaluate(&record, &tight), Ok(()));

        for delta in [1, 10, 500] {
            let looser = [
                FilterCriteria { min_total_cost: tight.min_total_cost - delta, ..tight.clone() },
                FilterCriteria { max_total_cost: tight.max_total_cost + delta, ..tight.clone() },
                FilterCriteria { min_bedrooms: tight.min_bedrooms.saturating_sub(delta), ..tight.clone() },
                FilterCriteria { min_bathrooms: tight.min_bathrooms.saturating_sub(delta), ..tight.clone() },
                FilterCriteria { min_total_area: tight.min_total_area - delta, ..tight.clone() },
            ];
            for criteria in &looser {
                assert_eq!(evaluate(&record, criteria), Ok(()), "{criteria:?}");
            }
        }
    }

    #[test]
    fn huge_scraped_amounts_do_not_overflow() {
        let record = ListingRecord {
            iptu: Some(1),
            condo_fee: Some(u64::MAX),
            bathrooms: Some(u64::MAX),
            en_suite_bathrooms: Some(1),
            ..ListingRecord::new(1, "https://x.test/1.html", u64::MAX)
        };

        assert_eq!(record.total_cost(), u64::MAX);
        assert_eq!(record.bathroom_count(), u64::MAX);
        assert_eq!(
            evaluate(&record, &FilterCriteria::default()),
            Err(Rejection::TooExpensive { total_cost: u64::MAX })
        );
        assert!(filter(&[record], &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn filter_preserves_order() {
        let records = vec![
            ListingRecord::new(1, "https://x.test/1.html", 5500),
            ListingRecord::new(2, "https://x.test/2.html", 100),
            ListingRecord::new(3, "https://x.test/3.html", 7000),
            ListingRecord::new(4, "https://x.test/4.html", 9000),
        ];

        let kept: Vec<u64> = filter(&records, &FilterCriteria::default())
            .iter()
            .map(|record| record.id)
            .collect();

        assert_eq!(kept, vec![1, 3]);
    }
}
