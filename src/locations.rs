/// Named-place registry backing the location search endpoint.
///
/// A small fixed table of place names with WGS84 coordinates. This is the
/// single source of truth for searchable locations; there is no external
/// geocoding and nothing here is persisted. Matching is a case-insensitive
/// substring check against the lowercase name, so an empty query matches
/// every entry.

use serde::Serialize;

/// A named place with its coordinates.
///
/// Names are stored lowercase; `search` renders them in title case for
/// display.
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Maximum number of matches a search returns.
pub const MAX_RESULTS: usize = 3;

/// All searchable places.
pub static PLACE_REGISTRY: &[Place] = &[
    Place {
        name: "central park",
        lat: 40.7850,
        lng: -73.9680,
    },
    Place {
        name: "times square",
        lat: 40.7580,
        lng: -73.9855,
    },
    Place {
        name: "soho",
        lat: 40.7230,
        lng: -74.0030,
    },
];

/// A search hit, with the place name rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMatch {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Case-insensitive substring search over the registry, capped at
/// `MAX_RESULTS`.
pub fn search(query: &str) -> Vec<LocationMatch> {
    let needle = query.to_lowercase();

    PLACE_REGISTRY
        .iter()
        .filter(|place| place.name.contains(&needle))
        .take(MAX_RESULTS)
        .map(|place| LocationMatch {
            name: title_case(place.name),
            lat: place.lat,
            lng: place.lng,
        })
        .collect()
}

/// Uppercase the first letter of each space-separated word.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
