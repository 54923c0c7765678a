//! Resort catalog types: resorts, points of interest, lifts and route requests.
//!
//! These are the shapes the app loads before a route is shown: the resort list, the POIs
//! offered as start/destination, and the lifts a rider may choose to avoid.

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// POI type used for bare graph nodes that are never offered as a destination.
pub const NODE_POI_TYPE: &str = "node";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Resort {
    pub id: i64,
    pub name: String,
    pub location: String,
}

/// A named point on the mountain (lift base, summit, lodge, trail junction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Poi {
    pub id: i64,
    pub ski_area_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub poi_type: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    pub osm_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Lift {
    pub id: i64,
    pub ski_area_id: i64,
    pub name: String,
    pub start_point_id: i64,
    pub end_point_id: i64,
    pub lift_type: String,
    pub estimated_time_minutes: f64,
}

/// Body of a route search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteRequest {
    pub ski_area_id: i64,
    pub start_point_id: i64,
    pub end_point_id: i64,
    /// Hardest trail rating the route may use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_difficulty: Option<Difficulty>,
    /// Lift ids the route must not ride
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid_lifts: Vec<i64>,
}

impl RouteRequest {
    pub fn new(ski_area_id: i64, start_point_id: i64, end_point_id: i64) -> Self {
        Self {
            ski_area_id,
            start_point_id,
            end_point_id,
            max_difficulty: None,
            avoid_lifts: Vec::new(),
        }
    }

    pub fn with_max_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.max_difficulty = Some(difficulty);
        self
    }

    pub fn avoiding(mut self, lifts: impl IntoIterator<Item = i64>) -> Self {
        self.avoid_lifts.extend(lifts);
        self
    }
}

/// One searchable entry in the start/destination pickers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct AutocompleteOption {
    /// Text matched against the search input
    pub label: String,
    /// POI id as a string; shared by a POI and all its aliases
    pub value: String,
    pub data: Poi,
}

/// Options for one POI: its own name first, then one per alias.
///
/// Graph nodes (`type == "node"`) produce no options.
///
/// # Example
/// ```
/// use skifinder_core::{Poi, poi_to_options};
///
/// let poi = Poi {
///     id: 12,
///     ski_area_id: 1,
///     name: "Summit Lodge".into(),
///     poi_type: "restaurant".into(),
///     latitude: 46.0,
///     longitude: 7.7,
///     aliases: Some(vec!["Top Hut".into()]),
///     osm_id: 99,
/// };
///
/// let options = poi_to_options(&poi);
/// assert_eq!(options.len(), 2);
/// assert_eq!(options[1].label, "Top Hut");
/// assert_eq!(options[1].value, "12");
/// ```
pub fn poi_to_options(poi: &Poi) -> Vec<AutocompleteOption> {
    if poi.poi_type == NODE_POI_TYPE {
        return Vec::new();
    }

    let value = poi.id.to_string();
    std::iter::once(poi.name.clone())
        .chain(poi.aliases.iter().flatten().cloned())
        .map(|label| AutocompleteOption {
            label,
            value: value.clone(),
            data: poi.clone(),
        })
        .collect()
}

/// Options for a whole POI list, in list order.
pub fn pois_to_options(pois: &[Poi]) -> Vec<AutocompleteOption> {
    pois.iter().flat_map(poi_to_options).collect()
}

/// Default number of suggestions shown under a picker.
pub const DEFAULT_MAX_OPTIONS: usize = 5;

/// Suggestions for the text typed into a picker.
///
/// Labels match by case-insensitive substring. A blank query yields every option when
/// `show_all` is set (picker just focused) and nothing otherwise. At most `max` options
/// are returned, in input order.
pub fn filter_options(
    options: &[AutocompleteOption],
    query: &str,
    show_all: bool,
    max: usize,
) -> Vec<AutocompleteOption> {
    if query.trim().is_empty() {
        if !show_all {
            return Vec::new();
        }
        return options.iter().take(max).cloned().collect();
    }

    let needle = query.to_lowercase();
    options
        .iter()
        .filter(|option| option.label.to_lowercase().contains(&needle))
        .take(max)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(id: i64, name: &str, poi_type: &str, aliases: Option<Vec<&str>>) -> Poi {
        Poi {
            id,
            ski_area_id: 1,
            name: name.to_string(),
            poi_type: poi_type.to_string(),
            latitude: 46.0,
            longitude: 7.7,
            aliases: aliases.map(|a| a.into_iter().map(String::from).collect()),
            osm_id: id * 10,
        }
    }

    #[test]
    fn test_poi_without_aliases() {
        let options = poi_to_options(&poi(3, "Base Area", "lift_station", None));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Base Area");
        assert_eq!(options[0].value, "3");
    }

    #[test]
    fn test_poi_aliases_share_value() {
        let options = poi_to_options(&poi(5, "Peak 8", "peak", Some(vec!["P8", "Eight"])));
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Peak 8", "P8", "Eight"]);
        assert!(options.iter().all(|o| o.value == "5" && o.data.id == 5));
    }

    #[test]
    fn test_node_pois_are_skipped() {
        assert!(poi_to_options(&poi(7, "n123", NODE_POI_TYPE, Some(vec!["x"]))).is_empty());
    }

    #[test]
    fn test_pois_to_options_flattens() {
        let pois = vec![
            poi(1, "A", "peak", Some(vec!["a"])),
            poi(2, "n", NODE_POI_TYPE, None),
            poi(3, "B", "lodge", None),
        ];
        let values: Vec<_> = pois_to_options(&pois).into_iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["1", "1", "3"]);
    }

    fn sample_options() -> Vec<AutocompleteOption> {
        pois_to_options(&[
            poi(1, "Summit Lodge", "restaurant", Some(vec!["Top Hut"])),
            poi(2, "Base Lodge", "restaurant", None),
            poi(3, "Gondola Base", "lift_station", None),
        ])
    }

    #[test]
    fn test_filter_matches_substring_ignoring_case() {
        let labels: Vec<_> = filter_options(&sample_options(), "LODGE", false, DEFAULT_MAX_OPTIONS)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["Summit Lodge", "Base Lodge"]);

        let alias = filter_options(&sample_options(), "hut", false, DEFAULT_MAX_OPTIONS);
        assert_eq!(alias.len(), 1);
        assert_eq!(alias[0].value, "1");
    }

    #[test]
    fn test_filter_blank_query() {
        let options = sample_options();
        assert!(filter_options(&options, "   ", false, DEFAULT_MAX_OPTIONS).is_empty());
        assert_eq!(filter_options(&options, "", true, DEFAULT_MAX_OPTIONS).len(), 4);
    }

    #[test]
    fn test_filter_caps_results() {
        let options = sample_options();
        assert_eq!(filter_options(&options, "", true, 2).len(), 2);
        let capped = filter_options(&options, "o", false, 1);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].label, "Summit Lodge");
    }

    #[test]
    fn test_poi_deserializes_with_null_aliases() {
        let json = r#"{"id":1,"ski_area_id":2,"name":"Lodge","type":"restaurant",
            "latitude":46.0,"longitude":7.7,"aliases":null,"osm_id":5}"#;
        let poi: Poi = serde_json::from_str(json).unwrap();
        assert_eq!(poi.poi_type, "restaurant");
        assert!(poi.aliases.is_none());
    }

    #[test]
    fn test_route_request_serialization() {
        let request = RouteRequest::new(1, 10, 20)
            .with_max_difficulty(Difficulty::BlueBlack)
            .avoiding([4, 9]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_difficulty"], "blue_black");
        assert_eq!(json["avoid_lifts"], serde_json::json!([4, 9]));

        let bare = serde_json::to_value(RouteRequest::new(1, 10, 20)).unwrap();
        assert!(bare.get("max_difficulty").is_none());
        assert!(bare.get("avoid_lifts").is_none());
    }
}
