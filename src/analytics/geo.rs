//! Map aggregation: bucket `"City, ST"` points by state and by city
//!
//! Labels are normalized (NFD, combining marks stripped, lowercased,
//! whitespace collapsed) so accent and case variants share a bucket.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::storage::models::TS_EXPORT_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoPoint {
    /// `"City, ST"`
    pub city: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoAggregation {
    pub states: BTreeMap<String, u64>,
    pub cities: BTreeMap<String, u64>,
}

/// NFD, drop combining marks, lowercase, trim, collapse inner whitespace
pub fn normalize_label(input: &str) -> String {
    let folded: String = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comma-separated parts of a normalized label, each trimmed, trailing empty
/// parts dropped.
fn label_parts(normalized: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = normalized.split(',').map(str::trim).collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Bucket keys for one label: the city key is the parts joined with `", "`,
/// the state key is the last part when there is more than one.
fn bucket_keys(normalized: &str) -> (String, Option<String>) {
    let parts = label_parts(normalized);
    let state = (parts.len() > 1).then(|| parts[parts.len() - 1].to_string());
    (parts.join(", "), state)
}

pub fn aggregate(points: &[GeoPoint]) -> GeoAggregation {
    let mut result = GeoAggregation::default();

    for point in points {
        if point.count == 0 {
            continue;
        }
        let (city, state) = bucket_keys(&normalize_label(&point.city));
        if city.is_empty() {
            continue;
        }

        if let Some(state) = state {
            *result.states.entry(state).or_default() += point.count;
        }
        *result.cities.entry(city).or_default() += point.count;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(city: &str, count: u64) -> GeoPoint {
        GeoPoint {
            city: city.to_string(),
            count,
        }
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  São   Paulo,  SP "), "sao paulo, sp");
        assert_eq!(normalize_label("Zürich"), "zurich");
        assert_eq!(normalize_label("\tRIO\nde Janeiro"), "rio de janeiro");
    }

    #[test]
    fn test_accent_variants_share_state_bucket() {
        let result = aggregate(&[point("São Paulo, SP", 3), point("Sao Paulo, SP", 2)]);
        assert_eq!(result.states.get("sp"), Some(&5));
        assert_eq!(result.cities.get("sao paulo, sp"), Some(&5));
        assert_eq!(result.cities.len(), 1);
    }

    #[test]
    fn test_point_without_comma_only_in_cities() {
        let result = aggregate(&[point("Lisbon", 4), point("Campinas, SP", 1)]);
        assert_eq!(result.cities.get("lisbon"), Some(&4));
        assert_eq!(result.states.len(), 1);
        assert_eq!(result.states.get("sp"), Some(&1));
    }

    #[test]
    fn test_same_city_name_different_states_stay_distinct() {
        let result = aggregate(&[point("Springfield, IL", 1), point("Springfield, MO", 2)]);
        assert_eq!(result.cities.get("springfield, il"), Some(&1));
        assert_eq!(result.cities.get("springfield, mo"), Some(&2));
    }

    #[test]
    fn test_state_is_text_after_last_comma() {
        let result = aggregate(&[point("Washington, D.C., DC", 2)]);
        assert_eq!(result.states.get("dc"), Some(&2));
    }

    #[test]
    fn test_empty_and_zero_points_ignored() {
        let result = aggregate(&[point("   ", 5), point("Belém, PA", 0), point("Natal, ", 1)]);
        assert!(result.states.is_empty());
        assert_eq!(result.cities.len(), 1);
        assert_eq!(result.cities.get("natal"), Some(&1));
    }

    #[test]
    fn test_comma_spacing_does_not_split_city_bucket() {
        let result = aggregate(&[
            point("São Paulo, SP", 3),
            point("Sao Paulo ,SP", 2),
            point("Natal, ", 1),
            point("Natal", 1),
        ]);
        assert_eq!(result.states.get("sp"), Some(&5));
        assert_eq!(result.cities.len(), 2);
        assert_eq!(result.cities.get("sao paulo, sp"), Some(&5));
        assert_eq!(result.cities.get("natal"), Some(&2));
    }

    #[test]
    fn test_inner_commas_are_canonicalized() {
        let result = aggregate(&[
            point("Washington ,D.C.,DC", 1),
            point("Washington, D.C., DC", 1),
        ]);
        assert_eq!(result.cities.get("washington, d.c., dc"), Some(&2));
        assert_eq!(result.states.get("dc"), Some(&2));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[]), GeoAggregation::default());
    }
}
